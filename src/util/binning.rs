//! Image binning.

use nalgebra::{DMatrix, DMatrixView};

/// Binning failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the binning factor {factor} is not an integer factor of the image dimensions {width}x{height}")]
pub struct BinError {
    pub factor: usize,
    pub width: usize,
    pub height: usize,
}

/// Bin an image by `factor`, averaging each `factor` by `factor` block.
///
/// `factor` must divide both image dimensions exactly.
pub fn bin_image(image: &DMatrix<f64>, factor: usize) -> Result<DMatrix<f64>, BinError> {
    bin_image_with(image, factor, |block| block.mean())
}

/// Bin an image with a custom block reducer, e.g. max for saturation maps.
pub fn bin_image_with<F>(
    image: &DMatrix<f64>,
    factor: usize,
    reduce: F,
) -> Result<DMatrix<f64>, BinError>
where
    F: for<'a> Fn(DMatrixView<'a, f64>) -> f64,
{
    if factor == 0 || image.nrows() % factor != 0 || image.ncols() % factor != 0 {
        return Err(BinError {
            factor,
            width: image.ncols(),
            height: image.nrows(),
        });
    }

    let rows = image.nrows() / factor;
    let cols = image.ncols() / factor;
    Ok(DMatrix::from_fn(rows, cols, |r, c| {
        reduce(image.view((r * factor, c * factor), (factor, factor)))
    }))
}

/// Bin every plane of a multi-channel image by the same factor.
pub fn bin_planes(planes: &[DMatrix<f64>], factor: usize) -> Result<Vec<DMatrix<f64>>, BinError> {
    planes.iter().map(|plane| bin_image(plane, factor)).collect()
}
