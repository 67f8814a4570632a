use clap::{App, Arg, ArgMatches};
use failure::Error;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mandelreveal::encode;
use mandelreveal::params::MAX_WORKERS;
use mandelreveal::render::Compositor;
use mandelreveal::{Canvas, Geometry, MandelError, Request, RunParameters, Session, View};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const WIDTH: &str = "width";
const ITERATIONS: &str = "iterations";
const CHUNK: &str = "chunk";
const WORKERS: &str = "workers";
const DENSITY: &str = "density";
const FRAMES: &str = "frames";
const QUERY: &str = "query";
const BASE64: &str = "base64";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandelreveal")
        .version("0.1.0")
        .about("Progressive scatter-reveal Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Directory to write each partial image and the finished frame into"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1024x512")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of the canvas"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.717,0.23")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Center of the view on the complex plane"),
        )
        .arg(
            Arg::with_name(WIDTH)
                .long(WIDTH)
                .short("w")
                .takes_value(true)
                .default_value("0.02")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse half-width",
                        "Half-width must be positive",
                    )
                })
                .help("Horizontal half-width of the view"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("2000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        u32::max_value(),
                        "Could not parse iteration count",
                        "Iteration count must be positive",
                    )
                })
                .help("Iterations before a point is presumed inside the set"),
        )
        .arg(
            Arg::with_name(CHUNK)
                .long(CHUNK)
                .short("r")
                .takes_value(true)
                .default_value("32")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1 << 20,
                        "Could not parse chunk size",
                        "Chunk size must be between 1 and 1048576",
                    )
                })
                .help("Pixels per partial image, in units of 1024"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .long(WORKERS)
                .short("t")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        MAX_WORKERS,
                        "Could not parse worker count",
                        &format!("Worker count must be between 1 and {}", MAX_WORKERS),
                    )
                })
                .help("Number of threads per partial image [default: number of CPUs]"),
        )
        .arg(
            Arg::with_name(DENSITY)
                .long(DENSITY)
                .short("d")
                .takes_value(true)
                .default_value("8")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        u32::max_value(),
                        "Could not parse color density",
                        "Color density must be positive",
                    )
                })
                .help("Color cycling rate"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 10000",
                    )
                })
                .help("Number of frames to reveal"),
        )
        .arg(
            Arg::with_name(QUERY)
                .long(QUERY)
                .short("q")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .help(
                    "Navigation query applied before a frame, e.g. 'newpt=300|200&in=1'; \
                     give one per frame",
                ),
        )
        .arg(
            Arg::with_name(BASE64)
                .long(BASE64)
                .short("b")
                .help("Print every partial image to stdout as a Base64 PNG"),
        )
        .get_matches()
}

fn write_png(dir: &Path, name: &str, canvas: &Canvas) -> Result<(), Error> {
    let path = dir.join(name);
    fs::write(&path, encode::png(canvas)?)?;
    info!("wrote {}", path.display());
    Ok(())
}

fn session_from(matches: &ArgMatches) -> Result<Session, Error> {
    // The validators have already vetted every value read here.
    let (width, height): (usize, usize) =
        parse_pair(matches.value_of(SIZE).unwrap_or_default(), 'x')
            .ok_or_else(|| failure::err_msg("Error parsing image dimensions"))?;
    let (x, y): (f64, f64) = parse_pair(matches.value_of(CENTER).unwrap_or_default(), ',')
        .ok_or_else(|| failure::err_msg("Error parsing center point"))?;
    let half_width = f64::from_str(matches.value_of(WIDTH).unwrap_or_default())?;
    let workers = match matches.value_of(WORKERS) {
        Some(w) => usize::from_str(w)?,
        None => num_cpus::get().max(1).min(MAX_WORKERS),
    };
    let params = RunParameters::new(
        usize::from_str(matches.value_of(CHUNK).unwrap_or_default())?,
        u32::from_str(matches.value_of(ITERATIONS).unwrap_or_default())?,
        workers,
        u32::from_str(matches.value_of(DENSITY).unwrap_or_default())?,
    )?;
    Ok(Session::new(
        Geometry::new(width, height)?,
        View::new(x, y, half_width)?,
        params,
    ))
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let mut session = session_from(matches)?;
    let frames = usize::from_str(matches.value_of(FRAMES).unwrap_or_default())?;
    let queries: Vec<&str> = matches.values_of(QUERY).map(|q| q.collect()).unwrap_or_default();
    let output: Option<PathBuf> = matches.value_of(OUTPUT).map(PathBuf::from);
    let print_base64 = matches.is_present(BASE64);

    if let Some(ref dir) = output {
        fs::create_dir_all(dir)?;
    }

    for frame in 0..frames {
        if let Some(query) = queries.get(frame) {
            let outcome = session.navigate(&Request::parse(query));
            if !outcome.rejected.is_empty() {
                warn!("{} navigation value(s) refused for frame {}", outcome.rejected.len(), frame);
            }
        }

        let total = session.total();
        let mut composite = Compositor::new(session.geometry());
        let mut pass = 0;
        let banner = session.run_frame(|position, canvas| {
            if print_base64 {
                println!("{}", encode::base64_png(canvas)?);
            }
            if let Some(ref dir) = output {
                write_png(dir, &format!("frame{:03}-pass{:03}.png", frame, pass), canvas)
                    .map_err(|e| MandelError::Output(e.to_string()))?;
            }
            info!("frame {} pass {}: {}/{} pixels", frame, pass, position, total);
            composite.merge(canvas.clone());
            pass += 1;
            Ok(())
        })?;

        if let Some(ref dir) = output {
            write_png(dir, &format!("frame{:03}.png", frame), &composite.finish())?;
        }
        println!("{}", banner);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
