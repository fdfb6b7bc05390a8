//! Tilerunner command line entry point
//!
//! Headless tools around the simulation:
//! - `tilerunner verify <level-code-file> <replay-file> [tuning.json]`
//! - `tilerunner info <replay-file>`

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::path::Path;
    use std::process::ExitCode;

    use tilerunner::consts::{LEVEL_HEIGHT, LEVEL_WIDTH};
    use tilerunner::leaderboard;
    use tilerunner::{Level, Replay, Tuning};

    const USAGE: &str = "usage:
  tilerunner verify <level-code-file> <replay-file> [tuning.json]
  tilerunner info <replay-file>";

    fn load_replay(path: &str) -> Result<Replay, String> {
        Replay::load_from_file(Path::new(path)).map_err(|e| format!("{}: {}", path, e))
    }

    fn verify(level_path: &str, replay_path: &str, tuning_path: Option<&str>) -> Result<ExitCode, String> {
        let code = fs::read_to_string(level_path).map_err(|e| format!("{}: {}", level_path, e))?;
        let level = Level::from_code(LEVEL_WIDTH, LEVEL_HEIGHT, &code).map_err(|e| e.to_string())?;
        if !level.is_valid() {
            log::warn!("{} needs exactly one begin and one end tile", level_path);
        }
        let replay = load_replay(replay_path)?;
        let tuning = tuning_path.map_or_else(Tuning::default, |p| Tuning::load(Path::new(p)));

        match leaderboard::verify(&level, &replay, &tuning) {
            Some(time) => {
                println!("valid: goal reached in {:.2}s", time);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                println!("invalid: goal not reached in {} frames", replay.recorded_len());
                Ok(ExitCode::FAILURE)
            }
        }
    }

    fn info(replay_path: &str) -> Result<ExitCode, String> {
        let replay = load_replay(replay_path)?;
        println!("version:  {}", replay.version());
        println!("user:     {}", replay.user());
        println!("level:    {}", replay.level_id());
        println!("created:  {}", replay.created());
        println!("controls: {}", if replay.alt() { "alternate" } else { "standard" });
        println!("frames:   {}", replay.recorded_len());
        println!("time:     {:.2}s", replay.time());
        Ok(ExitCode::SUCCESS)
    }

    pub fn run(args: &[String]) -> ExitCode {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = match args.as_slice() {
            ["verify", level, replay] => verify(level, replay, None),
            ["verify", level, replay, tuning] => verify(level, replay, Some(tuning)),
            ["info", replay] => info(replay),
            _ => {
                eprintln!("{}", USAGE);
                return ExitCode::from(2);
            }
        };
        result.unwrap_or_else(|e| {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    cli::run(&args)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library only on the web; there is no command line
}
