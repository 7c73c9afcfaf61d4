use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

/// Reject anything that is not an absolute URL and hand on its canonical
/// form, the same form relative links take once joined against it.
fn seed_url(value: &str) -> Result<String, String> {
    url::Url::parse(value)
        .map(String::from)
        .map_err(|e| format!("'{}' is not an absolute URL: {}", value, e))
}

fn url_arg() -> clap::Arg {
    arg!(<URL>)
        .help("The first review listing page; discovered pages must start with it")
        .value_parser(seed_url)
}

fn max_crawl_arg() -> clap::Arg {
    arg!([MAX_CRAWL])
        .help("How many links may be examined in total while walking")
        .value_parser(clap::value_parser!(u64).range(1..))
        .default_value("20")
}

fn timeout_arg() -> clap::Arg {
    arg!(--"timeout" <SECONDS>)
        .required(false)
        .help("Request timeout in seconds")
        .value_parser(clap::value_parser!(u64).range(1..))
        .default_value("10")
}

fn resolve_from_page_arg() -> clap::Arg {
    arg!(--"resolve-from-page")
        .required(false)
        .help("Resolve relative links against the page they were found on instead of the seed")
        .action(clap::ArgAction::SetTrue)
}

fn output_args() -> [clap::Arg; 5] {
    [
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Where to write the table (default: data.csv, or data.json with --format json)")
            .value_parser(clap::value_parser!(String)),
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Table format")
            .value_parser(["csv", "json"])
            .default_value("csv"),
        arg!(-w --"workers" <NUM_WORKERS>)
            .required(false)
            .help("Number of pages fetched concurrently during extraction")
            .value_parser(clap::value_parser!(u64).range(1..))
            .default_value("1"),
        arg!(--"lenient")
            .required(false)
            .help("Skip reviews missing their text or rating instead of failing")
            .action(clap::ArgAction::SetTrue),
        timeout_arg(),
    ]
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("revue")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("revue")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("crawl")
                .about(
                    "Walk the pagination links from URL, extract every review and write the \
                table.",
                )
                .arg(url_arg())
                .arg(max_crawl_arg())
                .args(output_args())
                .arg(resolve_from_page_arg()),
        )
        .subcommand(
            command!("walk")
                .about("Walk the pagination links from URL and print the pages that would be extracted.")
                .arg(url_arg())
                .arg(max_crawl_arg())
                .arg(timeout_arg())
                .arg(resolve_from_page_arg()),
        )
        .subcommand(
            command!("extract")
                .about("Extract reviews from the given pages without walking.")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("A single page to extract")
                        .value_parser(clap::value_parser!(url::Url))
                        .conflicts_with("urls-file"),
                )
                .arg(
                    arg!(-U --"urls-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of pages to extract, in order")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .group(
                    clap::ArgGroup::new("source")
                        .args(["url", "urls-file"])
                        .required(true),
                )
                .args(output_args()),
        )
}
