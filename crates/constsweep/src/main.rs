use constsweep::{Args, init_logging, models};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse_with_models(&models::registry());
    init_logging(args.verbose, args.log_file.as_deref())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = constsweep::run(&args, &mut out)?;

    tracing::info!(
        kernel = %summary.kernel_name,
        permutations = summary.permutations,
        results = summary.results,
        "sweep finished"
    );

    Ok(())
}
