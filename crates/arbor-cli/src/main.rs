use arbor::graph::{Diagram, DiagramDocument};
use arbor::{Algorithm, CompactTreeOptions, OrganicOptions};
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Model(arbor::graph::Error),
    Json(serde_json::Error),
    Json5(json5::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Model(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Json5(err) => write!(f, "options error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<arbor::graph::Error> for CliError {
    fn from(value: arbor::graph::Error) -> Self {
        Self::Model(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<json5::Error> for CliError {
    fn from(value: json5::Error) -> Self {
        Self::Json5(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Tree,
    Organic,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    parent: Option<String>,
    root: Option<String>,
    options: Option<String>,
    seed: Option<u64>,
    pretty: bool,
    out: Option<String>,
}

fn usage() -> &'static str {
    r#"arbor

USAGE:
  arbor [tree] [--parent <id>] [--root <id>] [--options <path>]
               [--pretty] [--out <path>] [<path>|-]
  arbor organic [--parent <id>] [--options <path>] [--seed <n>]
                [--pretty] [--out <path>] [<path>|-]

NOTES:
  - If <path> is omitted or '-', the diagram JSON is read from stdin.
  - --parent defaults to the default layer; --root is only used by the tree layout.
  - --options reads layout options from a JSON5 file (camelCase keys, all optional).
  - --seed makes organic layouts reproducible and overrides randomSeed from --options.
  - The laid out diagram is printed to stdout unless --out is given.
"#
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "tree" => args.command = Command::Tree,
            "organic" => args.command = Command::Organic,
            "--pretty" => args.pretty = true,
            "--parent" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.parent = Some(id.clone());
            }
            "--root" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.root = Some(id.clone());
            }
            "--options" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options = Some(path.clone());
            }
            "--seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = Some(seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            println!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn load_algorithm(args: &Args) -> Result<Algorithm, CliError> {
    let source = args
        .options
        .as_deref()
        .map(std::fs::read_to_string)
        .transpose()?;

    match args.command {
        Command::Tree => {
            let options = match source {
                Some(s) => json5::from_str::<CompactTreeOptions>(&s)?,
                None => CompactTreeOptions::default(),
            };
            Ok(Algorithm::CompactTree(options))
        }
        Command::Organic => {
            let mut options = match source {
                Some(s) => json5::from_str::<OrganicOptions>(&s)?,
                None => OrganicOptions::default(),
            };
            if args.seed.is_some() {
                options.random_seed = args.seed;
            }
            Ok(Algorithm::Organic(options))
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let algorithm = load_algorithm(&args)?;

    let text = read_input(args.input.as_deref())?;
    let doc: DiagramDocument = serde_json::from_str(&text)?;
    let mut diagram = Diagram::from_document(&doc)?;

    let parent = match args.parent.as_deref() {
        Some(id) => diagram.require(id)?,
        None => diagram.default_parent(),
    };
    let root = args
        .root
        .as_deref()
        .map(|id| diagram.require(id))
        .transpose()?;

    arbor::execute(&mut diagram, parent, root, &algorithm);

    let doc = diagram.to_document();
    let json = if args.pretty {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };
    write_text(&json, args.out.as_deref())
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
