//! Interactive session with rustyline
//!
//! Lines are evaluated against a persistent host module, so bindings survive
//! between inputs. `:` commands drive the source loader.

use std::io;
use std::path::PathBuf;

use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;

use crate::loader::engine::SourceEngine;
use crate::loader::module::{LoadedModule, ModuleHandle, ModuleOrigin};
use crate::loader::SourceLoader;
use crate::script::value::Value;

/// REPL configuration
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Prompt to display
    pub prompt: String,
    /// History file path
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "rig> ".into(),
            history_file: None,
        }
    }
}

/// Line-based interactive session.
pub struct Repl {
    config: ReplConfig,
    editor: Editor<(), FileHistory>,
    loader: SourceLoader,
    session: ModuleHandle,
}

impl Repl {
    pub fn new() -> io::Result<Self> {
        Self::with_config(ReplConfig::default())
    }

    pub fn with_config(config: ReplConfig) -> io::Result<Self> {
        let rl_config = Config::builder().history_ignore_space(true).build();
        let mut editor = Editor::with_config(rl_config)
            .map_err(|e| io::Error::other(format!("readline error: {e:?}")))?;

        if let Some(history_file) = &config.history_file {
            if history_file.exists() {
                let _ = editor.load_history(history_file);
            }
        }

        Ok(Self {
            config,
            editor,
            loader: SourceLoader::new(),
            session: LoadedModule::new("session", ModuleOrigin::Host),
        })
    }

    /// Run until `:quit` or Ctrl-D.
    pub fn run(&mut self) -> io::Result<()> {
        println!("camrig {} - type :help for commands", crate::VERSION);
        println!("Press Ctrl+D or :quit to exit\n");

        loop {
            match self.editor.readline(&self.config.prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }
                    self.evaluate(line);
                }
                Err(ReadlineError::Eof) => break,
                Err(ReadlineError::Interrupted) => {
                    println!("(interrupted)");
                    continue;
                }
                Err(e) => return Err(io::Error::other(e.to_string())),
            }
        }

        if let Some(history_file) = &self.config.history_file {
            let _ = self.editor.save_history(history_file);
        }
        Ok(())
    }

    /// Handle a `:` command; returns true when the session should end.
    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or("");
        let arg = parts.next().map(str::trim).unwrap_or("");

        match command {
            ":help" | ":h" => {
                println!(":help            show this help");
                println!(":load <path>     load a .rig file or package directory");
                println!(":unload <path>   unload modules loaded from a path");
                println!(":mods            list loaded modules");
                println!(":quit            exit");
            }
            ":quit" | ":q" => return true,
            ":mods" => {
                if self.loader.registry().is_empty() {
                    println!("(no modules loaded)");
                }
                for module in self.loader.registry().modules() {
                    println!("{}  [{}]  {}", module.name, module.origin.kind(), module.origin);
                }
            }
            ":load" => {
                if arg.is_empty() {
                    println!("usage: :load <path>");
                } else {
                    match self.loader.load(arg) {
                        Ok(module) => println!("loaded {}", module.name),
                        Err(err) => println!("error: {err}"),
                    }
                }
            }
            ":unload" => {
                if arg.is_empty() {
                    println!("usage: :unload <path>");
                } else {
                    self.loader.unload(arg);
                }
            }
            other => println!("unknown command {other}, try :help"),
        }
        false
    }

    /// Evaluate a line in the session module, echoing non-unit results.
    fn evaluate(&mut self, line: &str) {
        match self
            .loader
            .engine()
            .execute_str(line, &self.session, self.loader.registry())
        {
            Ok(Value::Unit) => {}
            Ok(value) => println!("{}", value.repr()),
            Err(err) => println!("error: {err}"),
        }
    }
}
