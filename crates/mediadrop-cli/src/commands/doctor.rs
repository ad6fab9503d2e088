use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use mediadrop_core::config::Config;

enum Check {
    Ok { path: PathBuf, version: String },
    BrokenBinary { path: PathBuf },
    Missing,
}

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("mediadrop dependency check\n");

    let (yt_dlp, ffmpeg) = futures::join!(
        check(config.yt_dlp_path().ok(), &["--version"]),
        check(config.ffmpeg_path().ok(), &["-version"]),
    );

    let mut all_ok = true;

    print!("yt-dlp:  ");
    all_ok &= report(&yt_dlp, "Install with: pip install -U yt-dlp", |out| {
        out.trim().to_string()
    });

    print!("ffmpeg:  ");
    all_ok &= report(&ffmpeg, "Needed for audio (mp3) downloads; install from your package manager", |out| {
        // "ffmpeg version 6.1.1 Copyright ..."
        out.lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(2))
            .unwrap_or("unknown")
            .to_string()
    });

    print!("workdir: ");
    match tokio::fs::create_dir_all(config.temp_dir()).await {
        Ok(()) => println!("OK ({})", config.temp_dir().display()),
        Err(e) => {
            println!("NOT WRITABLE ({}: {})", config.temp_dir().display(), e);
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

async fn check(path: Option<PathBuf>, version_args: &[&str]) -> Check {
    let Some(path) = path else {
        return Check::Missing;
    };

    match Command::new(&path).args(version_args).output().await {
        Ok(out) if out.status.success() => Check::Ok {
            version: String::from_utf8_lossy(&out.stdout).into_owned(),
            path,
        },
        _ => Check::BrokenBinary { path },
    }
}

fn report(check: &Check, hint: &str, version: impl Fn(&str) -> String) -> bool {
    match check {
        Check::Ok { path, version: out } => {
            println!("OK ({}, {})", version(out), path.display());
            true
        }
        Check::BrokenBinary { path } => {
            println!("FOUND at {} but failed to get version", path.display());
            false
        }
        Check::Missing => {
            println!("NOT FOUND");
            println!("         {}", hint);
            false
        }
    }
}
