use std::{
    fs::File,
    io::{self, BufWriter, Write},
    time::Instant,
};

use log::info;

use tourdiff_core::{Error, Result, SolverOptions, logging, perturbed_hill_climb, read_problem};

fn main() -> Result<()> {
    let now = Instant::now();
    let options = SolverOptions::from_args()?;
    logging::init_logger(&options)?;

    info!("options: {options}");

    let problem = read_problem(options.input_path())?;
    info!(
        "input: name={} n={}",
        problem.name.as_deref().unwrap_or("-"),
        problem.len()
    );

    let initial: Vec<usize> = (0..problem.len()).collect();
    let (tour, stats) = perturbed_hill_climb(&problem.points, initial, options.climb_config())?;

    write_tour(&options, &tour)?;

    info!("stats: {stats}");
    info!(
        "output: n={} length={:.3} time={:.2}s",
        tour.len(),
        stats.best_length,
        now.elapsed().as_secs_f32()
    );

    Ok(())
}

fn write_tour(options: &SolverOptions, tour: &[usize]) -> Result<()> {
    let mut out: Box<dyn Write> = match options.output_path() {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            Error::other(format!("failed to create output file {}: {e}", path.display()))
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for node in tour {
        writeln!(out, "{node}")?;
    }
    out.flush()?;
    Ok(())
}
