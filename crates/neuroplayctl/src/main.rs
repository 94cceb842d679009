//! NeuroPlay Control - CLI client for the game completion pipeline
//!
//! Talks HTTP to the neuroplayd daemon: submit sessions, poll job
//! status, register students and check daemon health.

mod cli;
mod client;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use client::DaemonClient;
use neuroplay_common::{JobStatusResponse, RegisterStudentRequest};
use owo_colors::OwoColorize;
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(&cli.addr)?;

    match cli.command {
        Commands::Submit {
            student,
            game,
            score,
            duration,
            accuracy,
            completed,
            session,
            wait,
        } => {
            let mut payload = json!({
                "student_id": student,
                "game_type": game,
                "score": score,
                "duration_seconds": duration,
                "accuracy": accuracy,
                "completed": completed,
            });
            if let Some(session_id) = session {
                payload["session_id"] = json!(session_id);
            }

            let ack = client.submit(&payload).await?;
            println!("{} job {}", "accepted".green(), ack.job_id.bold());

            if wait {
                let status = wait_for_result(&client, &ack.job_id).await?;
                print_status(&status, false)?;
            }
        }

        Commands::Status { job_id, json } => {
            let status = client.status(&job_id).await?;
            print_status(&status, json)?;
        }

        Commands::Register {
            student_id,
            xp,
            streak,
        } => {
            let state = client
                .register(&RegisterStudentRequest {
                    student_id,
                    daily_streak: streak,
                    xp,
                })
                .await?;
            println!(
                "{} student {} (xp {}, level {})",
                "registered".green(),
                student_id.bold(),
                state["xp"],
                state["level"]
            );
        }

        Commands::Health => {
            let health = client.health().await?;
            let status = if health.status == "healthy" {
                health.status.green().to_string()
            } else {
                health.status.red().to_string()
            };
            println!("{}", "  NeuroPlay Daemon".bold());
            println!("  Status:      {status}");
            println!("  Version:     {}", health.version);
            println!("  Uptime:      {}s", health.uptime_seconds);
            println!("  Queue depth: {}", health.queue_depth);
            println!("  Workers:     {}", health.workers);
        }
    }

    Ok(())
}

/// Poll until the job leaves the processing state.
async fn wait_for_result(client: &DaemonClient, job_id: &str) -> Result<JobStatusResponse> {
    loop {
        let status = client.status(job_id).await?;
        match status {
            JobStatusResponse::Processing { .. } => {
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
            terminal => return Ok(terminal),
        }
    }
}

fn print_status(status: &JobStatusResponse, raw_json: bool) -> Result<()> {
    if raw_json {
        println!("{}", serde_json::to_string_pretty(status)?);
        return Ok(());
    }

    match status {
        JobStatusResponse::NotFound { job_id } => {
            println!("{} job {job_id} is unknown or expired", "not found".yellow());
        }
        JobStatusResponse::Processing { job_id } => {
            println!("{} job {job_id}", "processing".yellow());
        }
        JobStatusResponse::Failed { job_id, reason } => {
            println!("{} job {job_id}: {reason}", "failed".red());
        }
        JobStatusResponse::Completed { job_id, result } => {
            println!("{} job {job_id}", "completed".green());
            println!("  Session:      {}", result.session_id);
            println!(
                "  XP gained:    {} (+{} bonus)",
                result.xp_gained, result.bonus_xp
            );
            println!("  Total XP:     {}", result.new_total_xp);
            if result.leveled_up {
                println!("  Level:        {} {}", result.level, "(level up!)".green());
            } else {
                println!("  Level:        {}", result.level);
            }
            println!("  Rating:       {}", result.performance_rating.as_str());
            println!("  Difficulty:   {}", result.difficulty_level);
            if !result.new_achievements.is_empty() {
                println!("  Achievements:");
                for achievement in &result.new_achievements {
                    println!("    {} {}", "*".green(), achievement.id);
                }
            }
            println!("  {}", result.feedback.message);
            for suggestion in &result.feedback.suggestions {
                println!("    - {suggestion}");
            }
        }
    }
    Ok(())
}
