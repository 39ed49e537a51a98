use clap::Parser;
use color_eyre::Result;
use tarantula_html::Args;

fn main() -> Result<()> {
    if std::env::var("RUST_BACKTRACE").is_err() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();
    color_eyre::install()?;

    let args = Args::parse();
    let stdout = std::io::stdout();
    tarantula_html::run(&args, &mut stdout.lock())
}
