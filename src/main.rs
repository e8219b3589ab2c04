use clap::{
    crate_authors, crate_description, crate_name, crate_version, App, AppSettings, Arg,
    ArgMatches, SubCommand,
};
use log::info;
use sfp::{
    config::{Backend, Config},
    digraph::{Digraph, SubgraphNode},
    lattice::{DataType, Node},
    loader::from_sqlite_file,
    miners::{selection_probability, Dfs, Graple, Miner, RejectingWalk, Vsigram, Weight},
    report::{CollectReporter, FileReporter},
};
use std::error::Error;
use std::io::Write;

fn parse_weight(weight: &str) -> Weight {
    match weight {
        "child-count" => Weight::ChildCount,
        "level" => Weight::Level,
        _ => Weight::Uniform,
    }
}

fn parse_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::default()
        .support(matches.value_of("support").unwrap_or("2").parse()?)
        .backend(Backend::new(matches.value_of("backend").unwrap_or("emb-list"))?)
        .unique(matches.is_present("unique"));
    if let Some(min_edges) = matches.value_of("min-edges") {
        config = config.min_edges(min_edges.parse()?);
    }
    if let Some(max_edges) = matches.value_of("max-edges") {
        config = config.max_edges(max_edges.parse()?);
    }
    if let Some(min_vertices) = matches.value_of("min-vertices") {
        config = config.min_vertices(min_vertices.parse()?);
    }
    if let Some(max_vertices) = matches.value_of("max-vertices") {
        config = config.max_vertices(max_vertices.parse()?);
    }
    if let Some(directory) = matches.value_of("cache-dir") {
        config = config.cache_dir(directory);
    }
    if let Some(workers) = matches.value_of("workers") {
        config = config.workers(workers.parse()?);
    }
    if let Some(samples) = matches.value_of("samples") {
        config = config.samples(samples.parse()?);
    }
    if let Some(seed) = matches.value_of("seed") {
        config = config.seed(seed.parse()?);
    }
    config.validate()?;
    Ok(config)
}

fn open_digraph(matches: &ArgMatches) -> Result<Digraph, Box<dyn Error>> {
    let config = parse_config(matches)?;
    let graph = from_sqlite_file(matches.value_of("SQLITE3").unwrap())?;
    info!("host graph: {}", graph.info());
    Ok(Digraph::new(graph, config)?)
}

fn create_reporter(matches: &ArgMatches) -> Result<FileReporter, Box<dyn Error>> {
    Ok(match matches.value_of("output") {
        Some(path) => FileReporter::create(path)?,
        None => FileReporter::stdout(),
    })
}

fn handle_dfs(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let dt = open_digraph(matches)?;
    let mut reporter = create_reporter(matches)?;
    Dfs::open(&dt.config().store)?.mine(&dt, &mut reporter)?;
    dt.close()?;
    Ok(())
}

fn handle_vsigram(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let dt = open_digraph(matches)?;
    let mut reporter = create_reporter(matches)?;
    Vsigram::from_config(dt.config()).mine(&dt, &mut reporter)?;
    dt.close()?;
    Ok(())
}

fn handle_graple(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let dt = open_digraph(matches)?;
    let weight = parse_weight(matches.value_of("weight").unwrap_or("uniform"));
    let mut miner = RejectingWalk::new(Graple::new(weight), dt.config());
    if matches.is_present("probability") {
        let mut samples: CollectReporter<SubgraphNode> = CollectReporter::new();
        miner.mine(&dt, &mut samples)?;
        let root = dt.root()?;
        let mut out: Box<dyn Write> = match matches.value_of("output") {
            Some(path) => Box::new(std::fs::File::create(path)?),
            None => Box::new(std::io::stdout()),
        };
        for sample in samples.nodes() {
            writeln!(
                out,
                "{}\t{}\t{}",
                sample,
                sample.support()?,
                selection_probability(&root, sample, &weight)?
            )?;
        }
        out.flush()?;
    } else {
        let mut reporter = create_reporter(matches)?;
        miner.mine(&dt, &mut reporter)?;
    }
    dt.close()?;
    Ok(())
}

fn lattice_args<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
    app.after_help(
        r"The SQLite3 file must contain the following schema:

  CREATE TABLE vertices (vid INT, vlabel);
  CREATE TABLE edges (src INT, dst INT, elabel);
",
    )
    .arg(Arg::with_name("SQLITE3").required(true))
    .arg(
        Arg::with_name("support")
            .help("Minimum number of distinct images of every pattern vertex")
            .long("support")
            .takes_value(true)
            .default_value("2"),
    )
    .arg(
        Arg::with_name("min-edges")
            .long("min-edges")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("max-edges")
            .help("Patterns with this many edges are not extended")
            .long("max-edges")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("min-vertices")
            .long("min-vertices")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("max-vertices")
            .long("max-vertices")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("backend")
            .help("How pattern embeddings are obtained")
            .long("backend")
            .takes_value(true)
            .default_value("emb-list")
            .possible_values(&["emb-list", "search"]),
    )
    .arg(
        Arg::with_name("cache-dir")
            .help("Keeps the lattice caches as SQLite3 files in this directory")
            .long("cache-dir")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("output")
            .help("Writes the reported patterns to this file instead of stdout")
            .long("output")
            .short("o")
            .takes_value(true),
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let matches = App::new(crate_name!())
        .about(crate_description!())
        .author(crate_authors!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(lattice_args(
            SubCommand::with_name("dfs").about("Lists every frequent pattern depth first"),
        ))
        .subcommand(lattice_args(
            SubCommand::with_name("vsigram")
                .about("Lists every frequent pattern with parallel workers")
                .arg(
                    Arg::with_name("workers")
                        .long("workers")
                        .takes_value(true),
                ),
        ))
        .subcommand(lattice_args(
            SubCommand::with_name("graple")
                .about("Samples maximal frequent patterns by absorbing random walks")
                .arg(
                    Arg::with_name("samples")
                        .help("Number of accepted samples")
                        .long("samples")
                        .takes_value(true)
                        .default_value("1"),
                )
                .arg(
                    Arg::with_name("unique")
                        .help("Reports every pattern at most once")
                        .long("unique")
                        .takes_value(false),
                )
                .arg(Arg::with_name("seed").long("seed").takes_value(true))
                .arg(
                    Arg::with_name("weight")
                        .help("Transition weight of a step")
                        .long("weight")
                        .takes_value(true)
                        .default_value("uniform")
                        .possible_values(&["uniform", "child-count", "level"]),
                )
                .arg(
                    Arg::with_name("probability")
                        .help("Appends the selection probability of every sample")
                        .long("probability")
                        .takes_value(false),
                ),
        ))
        .get_matches();
    if let Some(matches) = matches.subcommand_matches("dfs") {
        handle_dfs(matches)?;
    } else if let Some(matches) = matches.subcommand_matches("vsigram") {
        handle_vsigram(matches)?;
    } else if let Some(matches) = matches.subcommand_matches("graple") {
        handle_graple(matches)?;
    }
    Ok(())
}
