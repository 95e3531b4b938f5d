//! Build automation for the Pico sensor sketches.
//!
//! Run with: `cargo xtask <command>`

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::process::{Command, ExitCode};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for the Pico sensor sketches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: host tests, every sketch for both boards, docs
    CheckAll,
    /// Run the host tests
    Test,
    /// Build one sketch
    Firmware {
        sketch: Sketch,
        #[arg(long, default_value = "pico1")]
        board: Board,
        #[arg(long)]
        release: bool,
    },
    /// Build UF2 firmware file for flashing to Pico
    Uf2 {
        sketch: Sketch,
        #[arg(long, default_value = "pico1")]
        board: Board,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Board {
    Pico1,
    Pico2,
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Board::Pico1 => write!(f, "pico1"),
            Board::Pico2 => write!(f, "pico2"),
        }
    }
}

impl Board {
    const ALL: [Board; 2] = [Board::Pico1, Board::Pico2];

    fn target(self) -> &'static str {
        match self {
            Board::Pico1 => "thumbv6m-none-eabi",
            Board::Pico2 => "thumbv8m.main-none-eabihf",
        }
    }

    fn features(self) -> String {
        format!("{self},arm")
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Sketch {
    MenuDht,
    EchoDistance,
    SoundMeter,
}

impl Sketch {
    const ALL: [Sketch; 3] = [Sketch::MenuDht, Sketch::EchoDistance, Sketch::SoundMeter];

    /// Binary name in Cargo.toml.
    fn bin(self) -> &'static str {
        match self {
            Sketch::MenuDht => "menu_dht",
            Sketch::EchoDistance => "echo_distance",
            Sketch::SoundMeter => "sound_meter",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckAll => check_all(),
        Commands::Test => exit_code(run_host_tests()),
        Commands::Firmware {
            sketch,
            board,
            release,
        } => build_firmware(sketch, board, release),
        Commands::Uf2 { sketch, board } => build_uf2(sketch, board),
    }
}

fn check_all() -> ExitCode {
    println!("{}", "==> Running host tests...".cyan());
    if !run_host_tests() {
        return ExitCode::FAILURE;
    }

    for board in Board::ALL {
        println!("\n{}", format!("==> Building sketches ({board})...").cyan());
        for sketch in Sketch::ALL {
            println!("  {}", format!("- {}", sketch.bin()).bright_black());
            if !cargo_firmware("build", sketch, board, false) {
                return ExitCode::FAILURE;
            }
        }
    }

    println!("\n{}", "==> Building documentation...".cyan());
    let board = Board::Pico2;
    if !run_command(Command::new("cargo").current_dir(workspace_root()).args([
        "doc",
        "--lib",
        "--target",
        board.target(),
        "--no-deps",
        "--features",
        &board.features(),
    ])) {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> All checks passed!".green().bold());
    ExitCode::SUCCESS
}

fn run_host_tests() -> bool {
    let mut test_cmd = Command::new("cargo");
    test_cmd
        .current_dir(workspace_root())
        .args(["test", "--package", "pico-sensor-kit"]);

    match host_target() {
        Some(target) => {
            println!(
                "  {}",
                format!("Using host target: {target}").bright_black()
            );
            test_cmd.arg("--target").arg(target);
        }
        None => {
            println!(
                "{}",
                "  Unable to detect host target; relying on cargo default.".bright_black()
            );
        }
    }

    run_command(&mut test_cmd)
}

fn build_firmware(sketch: Sketch, board: Board, release: bool) -> ExitCode {
    println!(
        "{}",
        format!(
            "Building '{}' with features: {}",
            sketch.bin(),
            board.features()
        )
        .cyan()
    );

    if cargo_firmware("build", sketch, board, release) {
        println!("{}", "Build successful!".green());
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn build_uf2(sketch: Sketch, board: Board) -> ExitCode {
    let target = board.target();
    let name = sketch.bin();

    println!("{}", format!("Building UF2 for '{name}' ({board})").cyan());
    println!("  Features: {}", board.features().bright_black());
    println!("  Target: {}", target.bright_black());

    if !cargo_firmware("build", sketch, board, true) {
        return ExitCode::FAILURE;
    }

    let elf_path = format!("target/{target}/release/{name}");
    let uf2_path = format!("{name}-{board}.uf2");

    println!("\n{}", "Converting to UF2 format...".cyan());

    if run_command(
        Command::new("elf2uf2-rs")
            .current_dir(workspace_root())
            .args([&elf_path, &uf2_path]),
    ) {
        println!("{}", format!("UF2 created: {uf2_path}").green().bold());
        println!("{}", "Ready to drag-and-drop to your Pico!".bright_black());
        ExitCode::SUCCESS
    } else {
        println!(
            "{}",
            "Note: Install elf2uf2-rs with: cargo install elf2uf2-rs".yellow()
        );
        ExitCode::FAILURE
    }
}

fn cargo_firmware(subcommand: &str, sketch: Sketch, board: Board, release: bool) -> bool {
    let mut cmd = Command::new("cargo");
    cmd.current_dir(workspace_root()).args([
        subcommand,
        "--bin",
        sketch.bin(),
        "--target",
        board.target(),
        "--features",
        &board.features(),
    ]);
    if release {
        cmd.arg("--release");
    }
    run_command(&mut cmd)
}

fn workspace_root() -> std::path::PathBuf {
    // `cargo xtask` runs from the workspace root
    std::env::current_dir().expect("Failed to get current directory")
}

fn host_target() -> Option<String> {
    let output = Command::new("rustc").arg("-vV").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("host: "))
        .map(|host| host.trim().to_owned())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_command(cmd: &mut Command) -> bool {
    match cmd.status() {
        Ok(status) => status.success(),
        Err(e) => {
            eprintln!("{}", format!("Failed to execute command: {e}").red());
            false
        }
    }
}
