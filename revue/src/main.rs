use colored::Colorize;
use revue::commands::command_argument_builder;
use revue::handlers::{
    handle_crawl, handle_extract, handle_walk, init_tracing, writes_data_to_stdout,
};
use revue_core::banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing();

    // Show banner unless --quiet flag is set
    if !quiet {
        let subcommand = chosen_command.subcommand_name().unwrap_or_default();
        if writes_data_to_stdout(subcommand) {
            eprint!("{}", banner());
        } else {
            print!("{}", banner());
        }
    }

    let result = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command).await,
        Some(("walk", primary_command)) => handle_walk(primary_command).await,
        Some(("extract", primary_command)) => handle_extract(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
