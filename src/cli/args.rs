use clap::Args as ClapArgs;
use std::path::PathBuf;

use crate::rdl::CompileOptions;

/// Input arguments shared by every command that compiles RDL.
#[derive(ClapArgs, Debug, Clone)]
pub struct CompileArgs {
    /// One or more input files
    #[arg(value_name = "FILE", required = true)]
    pub input_files: Vec<PathBuf>,

    /// Search directory for files included with `include "filename"
    #[arg(short = 'I', value_name = "INCDIR")]
    pub incdirs: Vec<PathBuf>,

    /// Explicitly choose which addrmap in the root namespace will be the top-level component.
    /// If unset, the last addrmap defined will be chosen
    #[arg(short = 't', long, value_name = "TOP")]
    pub top: Option<String>,
}

impl From<CompileArgs> for CompileOptions {
    fn from(args: CompileArgs) -> Self {
        Self {
            input_files: args.input_files,
            incdirs: args.incdirs,
            top: args.top,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct DumpArgs {
    #[command(flatten)]
    pub compile: CompileArgs,

    /// Print the component tree as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the dump to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ListGlobalsArgs {
    /// One or more input files
    #[arg(value_name = "FILE", required = true)]
    pub input_files: Vec<PathBuf>,

    /// Search directory for files included with `include "filename"
    #[arg(short = 'I', value_name = "INCDIR")]
    pub incdirs: Vec<PathBuf>,
}

impl From<ListGlobalsArgs> for CompileOptions {
    fn from(args: ListGlobalsArgs) -> Self {
        Self {
            input_files: args.input_files,
            incdirs: args.incdirs,
            top: None,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
