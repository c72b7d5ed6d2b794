//! Lectern CLI: upload and manage course materials from the command line.
//!
//! Set LECTERN_SESSION_TOKEN and LECTERN_API_URL (or API_URL). The course comes
//! from `--course` or LECTERN_COURSE_ID; LECTERN_USER_ID enables `--owner mine`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lectern_api_client::ApiClient;
use lectern_cli::{init_tracing, MaterialRow, UploadRow};
use lectern_core::models::{CourseId, MaterialId, Visibility};
use lectern_core::{ClientConfig, MaterialApi};
use lectern_sync::{
    load_paths, MaterialFilter, MaterialsSession, OwnerFilter, ToggleOutcome, TypeFilter,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "lectern", about = "Lectern course materials CLI")]
struct Cli {
    /// Course to operate on (overrides LECTERN_COURSE_ID)
    #[arg(long, global = true)]
    course: Option<CourseId>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files (PDF, DOCX, TXT, JPG, PNG, GIF, SVG, XLSX, CSV)
    Upload {
        /// Paths of the files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List the course's materials
    List {
        /// Owner filter: all or mine
        #[arg(long, default_value = "all")]
        owner: OwnerFilter,
        /// Type filter: all, uploaded or generated
        #[arg(long = "type", default_value = "all")]
        kind: TypeFilter,
    },
    /// Make a material public or private
    Visibility {
        /// Material ID
        id: MaterialId,
        /// public or private
        visibility: Visibility,
    },
    /// Delete a material
    Delete {
        /// Material ID
        id: MaterialId,
    },
}

#[derive(Serialize)]
struct UploadOutput {
    course_id: CourseId,
    succeeded: usize,
    failed: usize,
    dismissed: usize,
    items: Vec<UploadRow>,
    skipped: Vec<String>,
}

#[derive(Serialize)]
struct ListOutput {
    course_id: CourseId,
    owner: String,
    r#type: String,
    total: usize,
    visible: usize,
    materials: Vec<MaterialRow>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ClientConfig::from_env().context(
        "Failed to load configuration. Set LECTERN_SESSION_TOKEN and LECTERN_API_URL (or API_URL)",
    )?;

    let course_id = cli
        .course
        .or(config.course_id)
        .context("No course selected. Pass --course or set LECTERN_COURSE_ID")?;

    let api: Arc<dyn MaterialApi> =
        Arc::new(ApiClient::from_config(&config).context("Failed to create API client")?);
    let session = MaterialsSession::new(api, course_id, config.user_id, config.upload);

    match cli.command {
        Commands::Upload { paths } => {
            let (files, unreadable) = load_paths(&paths).await;
            let summary = session.upload_files(files).await;

            let skipped = unreadable
                .iter()
                .chain(summary.rejected.iter())
                .map(|rejection| rejection.to_string())
                .collect();
            print_json(&UploadOutput {
                course_id,
                succeeded: summary.succeeded,
                failed: summary.failed,
                dismissed: summary.dismissed,
                items: summary.results.iter().map(UploadRow::from).collect(),
                skipped,
            })?;
        }
        Commands::List { owner, kind } => {
            session
                .refresh()
                .await
                .with_context(|| format!("Failed to list materials for course {}", course_id))?;

            let total = session.materials().await.len();
            let visible = session
                .visible_materials(&MaterialFilter::new(owner, kind))
                .await;
            print_json(&ListOutput {
                course_id,
                owner: owner.to_string(),
                r#type: kind.to_string(),
                total,
                visible: visible.len(),
                materials: visible
                    .iter()
                    .map(|m| MaterialRow::new(m, session.current_user()))
                    .collect(),
            })?;
        }
        Commands::Visibility { id, visibility } => {
            session
                .refresh()
                .await
                .with_context(|| format!("Failed to load materials for course {}", course_id))?;

            match session
                .toggle_material_visibility(id, visibility.is_public())
                .await
            {
                ToggleOutcome::Confirmed => {
                    let material = session
                        .material(id)
                        .await
                        .with_context(|| format!("Material {} vanished after update", id))?;
                    print_json(&MaterialRow::new(&material, session.current_user()))?;
                }
                ToggleOutcome::RolledBack(e) => {
                    return Err(e).context(format!("Failed to set material {} {}", id, visibility));
                }
                ToggleOutcome::Missing | ToggleOutcome::Discarded(_) => {
                    bail!("Material {} not found in course {}", id, course_id);
                }
                ToggleOutcome::Busy => bail!("Material {} is already being updated", id),
            }
        }
        Commands::Delete { id } => {
            session
                .refresh()
                .await
                .with_context(|| format!("Failed to load materials for course {}", course_id))?;

            let removed = session.delete_material(id).await;
            print_json(&serde_json::json!({
                "material_id": id,
                "removed": removed,
                "message": format!("Delete requested for material {}", id),
            }))?;
        }
    }

    Ok(())
}
