// SPDX-License-Identifier: MPL-2.0
use iced_preview::app::{self, Flags};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Usage: iced_preview [OPTIONS] IMAGE...

Options:
  --config FILE   Preview config to use instead of the platform default
  --index N       Open the preview on page N right away
  --show-index    Show the current/total counter
  --save          Show the save button
  -h, --help      Print this help
";

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let flags = match parse_flags(args) {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("{err}\n\n{HELP}");
            std::process::exit(2);
        }
    };

    app::run(flags)
}

fn parse_flags(mut args: pico_args::Arguments) -> Result<Flags, pico_args::Error> {
    let config_path = args.opt_value_from_str("--config")?;
    let index = args.opt_value_from_str("--index")?;
    let show_index = args.contains("--show-index");
    let save = args.contains("--save");
    let images = args
        .finish()
        .into_iter()
        .map(PathBuf::from)
        .collect();

    Ok(Flags {
        config_path,
        index,
        show_index,
        save,
        images,
    })
}
