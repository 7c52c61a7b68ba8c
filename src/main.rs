// src/main.rs
use metro_watch::cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = cli::run() {
        eprintln!("Erro: {e}");
        std::process::exit(1);
    }
    Ok(())
}
