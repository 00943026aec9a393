use anyhow::Result;
use clap::Parser;
use sbtree_rs_core::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    sbtree_rs_core::run_cli(&args)
}
