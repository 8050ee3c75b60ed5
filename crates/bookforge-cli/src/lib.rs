pub mod cli;
mod render;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use bookforge_core::book::{BookFilter, UpdateBook, Visibility};
use bookforge_core::preferences::UpdatePreferences;
use bookforge_service::{BookService, ForgeRequest, HttpService, ReadRequest};

use cli::{Cli, Command, PrefsAction};

pub fn service_for(cli: &Cli) -> HttpService {
    match cli.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => HttpService::with_api_key(&cli.server, key.to_string()),
        None => HttpService::new(&cli.server),
    }
}

/// Execute one command against `svc`, writing human-readable output to `out`.
pub async fn run(cli: Cli, svc: &HttpService, out: &mut impl Write) -> Result<()> {
    let reader = cli.reader;
    match cli.command {
        Command::Forge {
            idea,
            author,
            public,
        } => {
            let visibility = if public {
                Visibility::Public
            } else {
                Visibility::Private
            };
            tracing::info!("forging a book, this can take a minute");
            let book = svc
                .forge_book(&ForgeRequest {
                    idea: idea.join(" "),
                    author,
                    visibility,
                })
                .await?;
            render::book_details(out, &book)?;
        }
        Command::Library { visibility, author } => {
            let books = svc
                .list_books(&BookFilter {
                    visibility: visibility.map(Visibility::from),
                    author,
                    ..Default::default()
                })
                .await?;
            render::summaries(out, &books)?;
        }
        Command::Gallery { limit, offset } => {
            let gallery = svc.gallery(limit, offset).await?;
            render::summaries(out, &gallery.books)?;
            let shown_to = gallery.offset + gallery.books.len() as i64;
            if !gallery.books.is_empty() {
                writeln!(
                    out,
                    "\nshowing {}-{} of {}",
                    gallery.offset + 1,
                    shown_to,
                    gallery.total
                )?;
            }
        }
        Command::Show { id } => {
            let book = svc.get_book(&id).await?;
            render::book_details(out, &book)?;
        }
        Command::Read {
            id,
            page,
            words_per_page,
        } => {
            let view = svc
                .read_page(
                    &id,
                    &ReadRequest {
                        page: page.saturating_sub(1),
                        words_per_page,
                        reader_id: Some(reader),
                    },
                )
                .await?;
            render::page(out, &view)?;
        }
        Command::Cover { id, output } => {
            let cover = svc.cover(&id).await?;
            let path = output.map(PathBuf::from).unwrap_or_else(|| {
                PathBuf::from(format!("{id}.{}", cover.extension()))
            });
            tokio::fs::write(&path, &cover.bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            writeln!(
                out,
                "saved {} ({} bytes) to {}",
                cover.mime_type,
                cover.bytes.len(),
                path.display()
            )?;
        }
        Command::RegenerateCover { id } => {
            let book = svc.regenerate_cover(&id).await?;
            writeln!(out, "new cover for \"{}\": {}", book.title, book.cover_key)?;
        }
        Command::Edit { id, title, author } => {
            let book = svc
                .update_book(
                    &id,
                    &UpdateBook {
                        title,
                        author,
                        ..Default::default()
                    },
                )
                .await?;
            render::book_details(out, &book)?;
        }
        Command::Publish { id } => set_visibility(svc, out, &id, Visibility::Public).await?,
        Command::Unpublish { id } => set_visibility(svc, out, &id, Visibility::Private).await?,
        Command::Delete { id } => {
            svc.delete_book(&id).await?;
            writeln!(out, "deleted {id}")?;
        }
        Command::Prefs { action } => {
            let prefs = match action {
                PrefsAction::Show => svc.get_preferences(&reader).await?,
                PrefsAction::Set(set) => {
                    svc.update_preferences(
                        &reader,
                        &UpdatePreferences {
                            theme: set.theme.map(Into::into),
                            font_family: set.font.map(Into::into),
                            font_size: set.font_size,
                            words_per_page: set.words_per_page,
                        },
                    )
                    .await?
                }
            };
            render::preferences(out, &prefs)?;
        }
        Command::Health => {
            svc.health_check().await?;
            writeln!(out, "ok")?;
        }
    }
    Ok(())
}

async fn set_visibility(
    svc: &HttpService,
    out: &mut impl Write,
    id: &str,
    visibility: Visibility,
) -> Result<()> {
    let book = svc
        .update_book(
            id,
            &UpdateBook {
                visibility: Some(visibility),
                ..Default::default()
            },
        )
        .await?;
    writeln!(out, "\"{}\" is now {}", book.title, book.visibility)?;
    Ok(())
}
