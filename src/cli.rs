use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sbtree-rs",
    about = "Reduce Scratch 2 (.sb2) projects to indented sprite/block trees (.se)."
)]
pub struct Args {
    #[arg(
        value_name = "INPUT",
        help = "Directory of numeric owner subdirectories holding .sb2 files, or a single .sb2/.json file."
    )]
    pub input: PathBuf,

    #[arg(
        value_name = "OUTPUT",
        help = "Output directory (default: <INPUT>_se). For a single file: the .se file to write."
    )]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = 2, help = "Spaces per indentation level.")]
    pub indent_width: usize,

    #[arg(long, help = "Keep quoted argument values as leaf nodes.")]
    pub literals: bool,

    #[arg(long, help = "Print the trees to stdout instead of writing .se files.")]
    pub print: bool,

    #[arg(
        long,
        help = "Write into an existing output directory instead of replacing it."
    )]
    pub keep_output: bool,
}
