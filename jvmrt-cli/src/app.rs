use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// jvmrt - run and inspect Java class files
#[derive(Debug, Parser)]
#[command(name = "jvmrt", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Where the VM finds its classes.
#[derive(Debug, Args)]
pub struct VmOptions {
    /// JSON configuration file (class_path, max_stack_depth, properties).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Class path directories, searched in order. Replaces the configured class path.
    #[arg(long = "class-path", visible_alias = "cp", value_name = "DIR", value_delimiter = ',')]
    pub class_path: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the static main method of a class and wait for all non-daemon threads.
    Run {
        #[command(flatten)]
        vm: VmOptions,

        /// Main class, e.g. com.example.Main or com/example/Main.
        #[arg(short, long, value_name = "CLASS")]
        main: String,

        /// Arguments passed to main.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the bytecode listing of a class.
    Disasm {
        #[command(flatten)]
        vm: VmOptions,

        /// Class to disassemble.
        #[arg(short, long, value_name = "CLASS")]
        main: String,
    },

    /// Boot the VM and list the loaded classes with their initialization state.
    Classes {
        #[command(flatten)]
        vm: VmOptions,

        /// Show only classes in this state (e.g. Initialized, FailedInitialization).
        #[arg(long)]
        state: Option<String>,
    },
}
