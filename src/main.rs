//! ltn REPL - interactive logic-tensor-network knowledge bases.

use candle_core::{Device, Tensor};
use ltn::{
    balanced_circle_partition, uniform_samples, InitOptions, KnowledgeBase, LtnError, Result,
    TrainOptions,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::env;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut kb = KnowledgeBase::new(&Device::Cpu);

    // If a file argument is provided, execute it
    if args.len() > 1 {
        let file_path = &args[1];
        match run_script(file_path, &mut kb) {
            Ok(()) => println!("Executed: {}", file_path),
            Err(e) => {
                eprintln!("Error loading {}: {}", file_path, e);
                std::process::exit(1);
            }
        }

        // If --repl flag is passed, continue to REPL after executing file
        if args.len() > 2 && args[2] == "--repl" {
            return run_repl(kb);
        }

        print_state(&kb);
        return Ok(());
    }

    // No file argument - run interactive REPL
    println!("ltn v0.1.0 - logic tensor networks");
    println!("Type :help for commands, :quit to exit\n");

    run_repl(kb)
}

fn run_repl(mut kb: KnowledgeBase) -> Result<()> {
    let mut rl = DefaultEditor::new().map_err(|e| LtnError::Runtime(e.to_string()))?;

    loop {
        let readline = rl.readline("ltn> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                if trimmed.starts_with(':') {
                    if !handle_command(trimmed, &mut kb) {
                        break;
                    }
                } else {
                    handle_axiom(trimmed, &mut kb);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Bye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

/// Execute a script: bare lines are axioms, `:` lines are commands.
fn run_script(path: &str, kb: &mut KnowledgeBase) -> Result<()> {
    let content = fs::read_to_string(path).map_err(|e| LtnError::Runtime(e.to_string()))?;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if trimmed.starts_with(':') {
            handle_command(trimmed, kb);
        } else {
            handle_axiom(trimmed, kb);
        }
    }
    Ok(())
}

fn handle_axiom(line: &str, kb: &mut KnowledgeBase) {
    match kb.axiom(line) {
        Ok(()) => println!("Axiom: {}", line),
        Err(e) => println!("Error: {}", e),
    }
}

/// Handle REPL commands (starting with :)
/// Returns false if REPL should exit
fn handle_command(cmd: &str, kb: &mut KnowledgeBase) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let command = parts[0];

    match command {
        ":quit" | ":q" | ":exit" => {
            println!("Bye!");
            return false;
        }

        ":help" | ":h" | ":?" => {
            print_help();
        }

        ":predicate" | ":pred" => {
            // :predicate Name input_dim
            if parts.len() < 3 {
                println!("Usage: :predicate <name> <input_dim>");
            } else {
                match parts[2].parse::<usize>() {
                    Ok(dim) => match kb.predicate(parts[1], dim) {
                        Ok(()) => println!("Registered predicate {} over {} features", parts[1], dim),
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(e) => println!("Invalid input_dim: {}", e),
                }
            }
        }

        ":constant" | ":const" => {
            // :constant name v1 v2 ...
            if parts.len() < 3 {
                println!("Usage: :constant <name> <v1> [v2] ...");
            } else {
                let coords: std::result::Result<Vec<f32>, _> =
                    parts[2..].iter().map(|s| s.parse()).collect();
                match coords {
                    Ok(c) => match kb.constant(parts[1], &c) {
                        Ok(()) => println!("Bound constant {} = {:?}", parts[1], c),
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(e) => println!("Invalid coordinate: {}", e),
                }
            }
        }

        ":samples" => {
            // :samples ?name n [seed]
            if parts.len() < 3 {
                println!("Usage: :samples <?name> <n> [seed]");
            } else {
                let n = parts[2].parse::<usize>();
                let seed = parts
                    .get(3)
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(42);
                match n {
                    Ok(n) => {
                        let result = uniform_samples(n, [0.0, 0.0], [1.0, 1.0], seed, kb.device())
                            .and_then(|t| kb.variable(parts[1], t));
                        match result {
                            Ok(()) => println!("Bound {} to {} uniform samples", parts[1], n),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    Err(e) => println!("Invalid sample count: {}", e),
                }
            }
        }

        ":variable" | ":var" => {
            // :variable ?name file.csv
            if parts.len() < 3 {
                println!("Usage: :variable <?name> <file.csv>");
            } else {
                match load_csv(parts[2], kb.device()) {
                    Ok(t) => {
                        let n = t.dims()[0];
                        match kb.variable(parts[1], t) {
                            Ok(()) => println!("Bound {} to {} samples from {}", parts[1], n, parts[2]),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    Err(e) => println!("Error reading {}: {}", parts[2], e),
                }
            }
        }

        ":partition" => {
            // :partition ?src ?inside ?outside cx cy radius_sq
            if parts.len() < 7 {
                println!("Usage: :partition <?src> <?inside> <?outside> <cx> <cy> <radius_sq>");
            } else {
                let geometry: std::result::Result<Vec<f32>, _> =
                    parts[4..7].iter().map(|s| s.parse()).collect();
                let src = kb.variable_data(parts[1]).cloned();
                match (src, geometry) {
                    (Some(points), Ok(g)) => {
                        match balanced_circle_partition(&points, [g[0], g[1]], g[2]) {
                            Ok(p) => {
                                let n = p.inside.dims()[0];
                                let ok = kb
                                    .variable(parts[2], p.inside)
                                    .and_then(|_| kb.variable(parts[3], p.outside));
                                match ok {
                                    Ok(()) => println!(
                                        "Partitioned {} into {} / {} ({} samples each)",
                                        parts[1], parts[2], parts[3], n
                                    ),
                                    Err(e) => println!("Error: {}", e),
                                }
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    (None, _) => println!("Unknown variable: {}", parts[1]),
                    (_, Err(e)) => println!("Invalid geometry: {}", e),
                }
            }
        }

        ":init" => {
            // :init [threshold]
            let threshold = parts
                .get(1)
                .and_then(|s| s.parse::<f32>().ok())
                .unwrap_or(0.1);
            match kb.initialize(InitOptions {
                sat_threshold: threshold,
                ..Default::default()
            }) {
                Ok(sat) => println!("Initialized at satisfaction level {:.4}", sat),
                Err(e) => println!("Error: {}", e),
            }
        }

        ":train" => {
            // :train iterations [lr=F]
            let mut opts = TrainOptions::default();
            if let Some(n) = parts.get(1).and_then(|s| s.parse::<usize>().ok()) {
                opts.max_iterations = n;
            }
            for part in &parts[1..] {
                if let Some((key, value)) = part.split_once('=') {
                    match key {
                        "lr" => opts.learning_rate = value.parse().unwrap_or(opts.learning_rate),
                        "wd" => opts.weight_decay = value.parse().unwrap_or(opts.weight_decay),
                        _ => println!("Unknown option: {}", key),
                    }
                }
            }
            match kb.train(opts) {
                Ok(sat) => println!("Training complete. Satisfaction level: {:.4}", sat),
                Err(e) => println!("Training error: {}", e),
            }
        }

        ":sat" => match kb.satisfiability() {
            Ok(sat) => println!("Satisfaction level: {:.4}", sat),
            Err(e) => println!("Error: {}", e),
        },

        ":ask" => {
            // :ask <formula>
            if parts.len() < 2 {
                println!("Usage: :ask <formula>");
            } else {
                let expr = cmd[":ask".len()..].trim();
                match kb.ask(expr) {
                    Ok(truth) => print_truth(expr, &truth),
                    Err(e) => println!("Error: {}", e),
                }
            }
        }

        ":plot" => {
            // :plot ?var <expr...> > file.png  (expr evaluated, colored over ?var samples)
            if parts.len() < 4 {
                println!("Usage: :plot <?var> <formula> <file.png>");
            } else {
                let var = parts[1];
                let out = parts[parts.len() - 1];
                let expr = parts[2..parts.len() - 1].join(" ");
                let points = kb.variable_data(var).cloned();
                match points {
                    Some(points) => match kb.ask(&expr) {
                        Ok(truth) => {
                            match ltn::viz::scatter_truth(Path::new(out), &expr, &points, &truth) {
                                Ok(()) => println!("Wrote {}", out),
                                Err(e) => println!("Plot error: {}", e),
                            }
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Unknown variable: {}", var),
                }
            }
        }

        ":predicates" => {
            let names = kb.predicate_names();
            if names.is_empty() {
                println!("No predicates registered");
            } else {
                println!("Predicates:");
                for (name, dim) in names {
                    println!("  {} : {} features", name, dim);
                }
            }
        }

        ":variables" => {
            let names = kb.variable_names();
            if names.is_empty() {
                println!("No variables bound");
            } else {
                println!("Variables:");
                for (name, n) in names {
                    println!("  {} : {} samples", name, n);
                }
            }
        }

        ":constants" => {
            let names = kb.constant_names();
            if names.is_empty() {
                println!("No constants bound");
            } else {
                println!("Constants:");
                for name in names {
                    println!("  {}", name);
                }
            }
        }

        ":axioms" => {
            let sources = kb.axiom_sources();
            if sources.is_empty() {
                println!("No axioms registered");
            } else {
                println!("Axioms:");
                for src in sources {
                    println!("  {}", src);
                }
            }
        }

        _ => {
            println!("Unknown command: {}. Type :help for commands.", command);
        }
    }

    true
}

fn print_truth(expr: &str, truth: &ltn::Truth) {
    if truth.vars().is_empty() {
        match truth.to_scalar() {
            Ok(v) => println!("{} = {:.4}", expr, v),
            Err(e) => println!("Error: {}", e),
        }
    } else {
        match truth.to_vec() {
            Ok(values) => {
                let n = values.len();
                let mean = if n > 0 {
                    values.iter().sum::<f32>() / n as f32
                } else {
                    0.0
                };
                println!(
                    "{} over {}: {} truth values, mean {:.4}",
                    expr,
                    truth.vars().join(", "),
                    n,
                    mean
                );
            }
            Err(e) => println!("Error: {}", e),
        }
    }
}

fn print_state(kb: &KnowledgeBase) {
    for (name, dim) in kb.predicate_names() {
        println!("predicate {} : {} features", name, dim);
    }
    for (name, n) in kb.variable_names() {
        println!("variable {} : {} samples", name, n);
    }
    for name in kb.constant_names() {
        println!("constant {}", name);
    }
    for src in kb.axiom_sources() {
        println!("axiom {}", src);
    }
}

/// Load a rank-2 float tensor from a comma-separated text file.
fn load_csv(path: &str, device: &Device) -> Result<Tensor> {
    let content = fs::read_to_string(path).map_err(|e| LtnError::Runtime(e.to_string()))?;

    let mut data = Vec::new();
    let mut width = None;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row: std::result::Result<Vec<f32>, _> =
            line.split(',').map(|s| s.trim().parse()).collect();
        let row = row.map_err(|e| LtnError::Runtime(format!("bad row `{}`: {}", line, e)))?;

        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(LtnError::Runtime(format!(
                    "ragged csv: expected {} columns, got {}",
                    w,
                    row.len()
                )))
            }
            _ => {}
        }
        data.extend(row);
    }

    let width = width.ok_or_else(|| LtnError::Runtime("empty csv".into()))?;
    let rows = data.len() / width;
    Ok(Tensor::from_vec(data, (rows, width), device)?)
}

fn print_help() {
    println!("Statements:");
    println!("  forall ?x: A(?x)              Register an axiom (bare line)");
    println!();
    println!("Commands:");
    println!("  :predicate <name> <dim>       Register a predicate grounding");
    println!("  :constant <name> <v...>       Bind a constant point");
    println!("  :samples <?name> <n> [seed]   Bind uniform unit-square samples");
    println!("  :variable <?name> <file.csv>  Bind samples from a csv file");
    println!("  :partition <?src> <?in> <?out> <cx> <cy> <r2>");
    println!("                                Balanced circle partition");
    println!("  :init [threshold]             Re-randomize until sat > threshold");
    println!("  :train <iters> [lr=F] [wd=F]  Maximize axiom satisfaction");
    println!("  :sat                          Current satisfaction level");
    println!("  :ask <formula>                Evaluate a formula");
    println!("  :plot <?var> <formula> <file.png>");
    println!("                                Truth scatter over a sample set");
    println!("  :predicates :variables :constants :axioms");
    println!("                                List registry contents");
    println!("  :quit                         Exit");
}
