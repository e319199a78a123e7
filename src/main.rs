use clap::Parser;

use ditaa_render::Args;

fn main() {
    let args = Args::parse();

    // RUST_LOG, when set, wins over -v.
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_env(env_logger::Env::default())
        .init();

    if let Err(err) = ditaa_render::run(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
