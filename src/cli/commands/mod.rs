pub mod logging;
pub mod provider;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";
pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_ALLOWED_REDIRECT: &str = "allowed-redirect";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("portiere")
        .about("Authentication gateway demo")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("3000")
                .env("PORTIERE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_BASE_URL)
                .short('b')
                .long(ARG_BASE_URL)
                .help("Public base URL of this server, used to build magic links")
                .default_value("http://localhost:3000")
                .env("PORTIERE_BASE_URL"),
        )
        .arg(
            Arg::new(ARG_ALLOWED_REDIRECT)
                .long(ARG_ALLOWED_REDIRECT)
                .help("Allowlisted redirect destination, exact match only (repeatable)")
                .long_help(
                    "Allowlisted post-login/post-logout redirect destination. Client-supplied redirect_url values are honored only when they exactly match one of these entries; anything else falls back to a flow-specific default. Repeat the flag or comma-separate values.",
                )
                .env("PORTIERE_ALLOWED_REDIRECTS")
                .action(clap::ArgAction::Append)
                .value_delimiter(','),
        );

    let command = provider::with_args(command);
    logging::with_args(command)
}
