use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::Path;
use std::process;

use pantry_core::models::RecognizedIngredient;
use pantry_core::recognition::{
    RecognitionOutcome, interpret_reply, normalize_voice_text, parse_recognition_text,
    voice_lines,
};
use pantry_core::service::PantryService;

use crate::siliconflow::SiliconFlowClient;

use super::helpers::{json_error, print_recognized};
use super::pantry::print_commit_summary;

const NOTHING_RECOGNIZED: &str = "未识别出任何食材，请重新拍摄或手动添加";
const RECOGNITION_FAILED: &str = "识别失败，请重试";

pub(crate) async fn cmd_scan(
    svc: &PantryService,
    client: &SiliconFlowClient,
    image: &Path,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image: {}", image.display()))?;
    if bytes.is_empty() {
        bail!("Image file is empty: {}", image.display());
    }
    let reply = client.recognize_image_async(&bytes).await?;
    commit_reply(svc, &reply, dry_run, json)
}

pub(crate) async fn cmd_voice(
    svc: &PantryService,
    client: &SiliconFlowClient,
    text: &str,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let normalized = normalize_voice_text(text);
    let lines = voice_lines(&normalized);
    if lines.is_empty() {
        bail!("Nothing to recognize in '{text}'");
    }
    let reply = client.recognize_voice_async(&lines).await?;
    commit_reply(svc, &reply, dry_run, json)
}

/// Commit a recognition reply saved earlier; `-` reads stdin.
pub(crate) fn cmd_import(svc: &PantryService, file: &str, dry_run: bool, json: bool) -> Result<()> {
    let reply = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?
    };
    commit_reply(svc, &reply, dry_run, json)
}

fn commit_reply(svc: &PantryService, reply: &str, dry_run: bool, json: bool) -> Result<()> {
    let entries = match interpret_reply(reply) {
        RecognitionOutcome::Failed => bail!(RECOGNITION_FAILED),
        RecognitionOutcome::Empty => Vec::new(),
        RecognitionOutcome::Text(text) => parse_recognition_text(&text),
    };

    if !entries.iter().any(RecognizedIngredient::is_addable) {
        if json {
            println!("{}", json_error(NOTHING_RECOGNIZED));
        } else {
            if !entries.is_empty() {
                print_recognized(&entries);
            }
            eprintln!("{NOTHING_RECOGNIZED}");
        }
        process::exit(2);
    }

    if dry_run {
        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            print_recognized(&entries);
        }
        return Ok(());
    }

    let summary = svc.commit_recognized(entries);
    print_commit_summary(&summary, json)
}
