//! The interactive styling loop.
//!
//! Reads commands with rustyline, forwards intents to the [`Stylist`] and
//! renders the resulting session snapshot. While a freshly generated model
//! is under review only `keep` / `retry` (and session-neutral commands) are
//! accepted, so styling starts on an explicit confirmation.

use anyhow::Result;
use colored::Colorize;
use fitroom_application::Stylist;
use fitroom_core::error::FitroomError;
use fitroom_core::garment::Wardrobe;
use fitroom_core::media::ImageData;
use fitroom_core::pose;
use fitroom_core::session::SessionState;
use fitroom_infrastructure::{FileKeyStore, FitroomPaths, fetch};
use std::path::{Path, PathBuf};

use crate::render;

pub async fn run(
    stylist: Stylist,
    wardrobe: Wardrobe,
    paths: FitroomPaths,
    key_store: FileKeyStore,
    model: Option<String>,
) -> Result<()> {
    let mut repl = Repl {
        stylist,
        wardrobe,
        paths,
        key_store,
        model,
        http: reqwest::Client::new(),
        reviewing: false,
        export_counter: 0,
    };
    repl.print_welcome();

    let mut editor = rustyline::DefaultEditor::new()?;
    loop {
        let prompt = if repl.reviewing { "review> " } else { "fitroom> " };
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        let rest = words.collect::<Vec<_>>();

        if matches!(command.as_str(), "quit" | "exit") {
            break;
        }
        repl.dispatch(&command, &rest).await;
    }
    Ok(())
}

struct Repl {
    stylist: Stylist,
    wardrobe: Wardrobe,
    paths: FitroomPaths,
    key_store: FileKeyStore,
    model: Option<String>,
    http: reqwest::Client,
    /// True between a successful model generation and the explicit `keep`.
    reviewing: bool,
    export_counter: u32,
}

impl Repl {
    fn print_welcome(&self) {
        println!("{}", "FitRoom".bold());
        println!("Upload a photo, try on the wardrobe, switch poses. Type 'help' for commands.");
    }

    async fn dispatch(&mut self, command: &str, args: &[&str]) {
        if self.reviewing && !matches!(command, "keep" | "retry" | "export" | "status" | "help") {
            println!(
                "{}",
                "Reviewing the generated model: type 'keep' to proceed to styling or 'retry <photo>' to use a different photo.".yellow()
            );
            return;
        }

        match command {
            "help" => self.print_help(),
            "upload" => match args {
                [path] => self.upload(Path::new(path)).await,
                _ => println!("usage: upload <photo-file>"),
            },
            "keep" => {
                if self.reviewing {
                    self.reviewing = false;
                    println!("{}", "Model confirmed. Pick something from the wardrobe with 'wear <id>'.".green());
                } else {
                    println!("Nothing to confirm.");
                }
            }
            "retry" => match args {
                [path] if self.reviewing => {
                    if self.stylist.start_over().await.is_ok() {
                        self.reviewing = false;
                        self.upload(Path::new(path)).await;
                    }
                }
                _ if !self.reviewing => println!("Nothing to retry. Use 'upload <photo-file>'."),
                _ => println!("usage: retry <photo-file>"),
            },
            "wardrobe" => render::render_wardrobe(&self.wardrobe),
            "wear" => match args {
                [id] => self.wear(*id).await,
                _ => println!("usage: wear <garment-id> (see 'wardrobe')"),
            },
            "pose" => match args {
                [] => render::render_poses(&self.stylist.session().await),
                [name] => self.pose(*name).await,
                _ => println!("usage: pose [name]"),
            },
            "undo" => self.undo().await,
            "clear" => self.clear().await,
            "restart" => {
                match self.stylist.start_over().await {
                    Ok(()) => {
                        self.reviewing = false;
                        println!("Session discarded. Use 'upload <photo-file>' to start again.");
                    }
                    Err(err) => self.report(err).await,
                }
            }
            "stack" => render::render_stack(&self.stylist.session().await),
            "status" => render::render_status(&self.stylist.session().await),
            "export" => {
                let target = args.first().map(PathBuf::from);
                self.export(target).await;
            }
            "key" => match args {
                [key] => self.update_key(*key).await,
                _ => println!("usage: key <api-key>"),
            },
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }

    fn print_help(&self) {
        println!("{}", "Commands:".bold());
        println!("  upload <photo>   generate your model from a photo");
        println!("  keep / retry     confirm the generated model, or try another photo");
        println!("  wardrobe         list available garments");
        println!("  wear <id>        apply a garment on top of the outfit");
        println!("  pose [name]      list poses, or switch to one");
        println!("  undo             remove the last garment");
        println!("  clear            remove all garments");
        println!("  restart          discard the session");
        println!("  stack            show the outfit stack");
        println!("  status           show session state and last error");
        println!("  export [file]    save the displayed image");
        println!("  key <api-key>    replace the stored API key (starts a fresh session)");
        println!("  quit             leave");
    }

    async fn upload(&mut self, path: &Path) {
        let photo = match fetch::load_photo(path).await {
            Ok(photo) => photo,
            Err(err) => {
                println!("{}", err.friendly_message("Could not read photo").red());
                return;
            }
        };
        println!("Generating your model... this can take a little while.");
        match self.stylist.start_model_generation(&photo).await {
            Ok(_) => {
                self.reviewing = true;
                println!("{}", "Model generated.".green());
                println!("Use 'export' to look at it, then 'keep' to proceed to styling or 'retry <photo>'.");
            }
            Err(err) => self.report(err).await,
        }
    }

    async fn wear(&mut self, id: &str) {
        let Some(garment) = self.wardrobe.find(id).cloned() else {
            println!("No garment with id '{id}'. See 'wardrobe'.");
            return;
        };
        let image = match fetch::fetch_garment_image(&self.http, &garment.source).await {
            Ok(image) => image,
            Err(err) => {
                let context = format!("Could not load the image for {}", garment.name);
                println!("{}", err.friendly_message(&context).red());
                return;
            }
        };
        println!("Adding {}...", garment.name);
        let name = garment.name.clone();
        match self.stylist.select_garment(garment, &image).await {
            Ok(_) => {
                println!("{}", format!("{name} applied.").green());
                render::render_stack(&self.stylist.session().await);
            }
            Err(err) => self.report(err).await,
        }
    }

    async fn pose(&mut self, name: &str) {
        let Some(target) = pose::find_pose(name) else {
            let names = pose::POSES.iter().map(|p| p.name).collect::<Vec<_>>().join(", ");
            println!("Unknown pose '{name}'. Available: {names}");
            return;
        };
        match self.stylist.select_pose(target).await {
            Ok(()) => println!("Pose: {}", target.name.green()),
            Err(err) => self.report(err).await,
        }
    }

    async fn undo(&mut self) {
        match self.stylist.remove_last_garment().await {
            Ok(Some(layer)) => println!("Removed {}.", layer.display_name()),
            Ok(None) => println!("Nothing to remove; the base model stays."),
            Err(err) => self.report(err).await,
        }
    }

    async fn clear(&mut self) {
        match self.stylist.clear_outfit().await {
            Ok(()) => println!("Outfit cleared, back to the base model."),
            Err(err) => self.report(err).await,
        }
    }

    async fn export(&mut self, target: Option<PathBuf>) {
        let Some(url) = self.stylist.displayed_image_url().await else {
            println!("Nothing to export yet.");
            return;
        };
        let image = match ImageData::from_data_url(&url) {
            Ok(image) => image,
            Err(err) => {
                println!("{}", err.friendly_message("Could not decode the image").red());
                return;
            }
        };
        let path = match target {
            Some(path) => path,
            None => {
                let dir = match self.paths.export_dir() {
                    Ok(dir) => dir,
                    Err(err) => {
                        println!("{}", err.to_string().red());
                        return;
                    }
                };
                self.export_counter += 1;
                dir.join(format!(
                    "outfit-{:03}.{}",
                    self.export_counter,
                    extension_for(&image.mime)
                ))
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(err) = tokio::fs::create_dir_all(parent).await {
                println!("{}", format!("Could not create {}: {err}", parent.display()).red());
                return;
            }
        }
        match tokio::fs::write(&path, &image.bytes).await {
            Ok(()) => println!("Saved {}", path.display()),
            Err(err) => println!("{}", format!("Could not write {}: {err}", path.display()).red()),
        }
    }

    async fn update_key(&mut self, key: &str) {
        use fitroom_core::keystore::KeyStore;
        if let Err(err) = self.key_store.store(key).await {
            println!("{}", err.friendly_message("Could not save the key").red());
            return;
        }
        match fitroom_infrastructure::GeminiClient::new(key) {
            Ok(mut client) => {
                if let Some(model) = &self.model {
                    client = client.with_model(model.as_str());
                }
                self.stylist = Stylist::new(std::sync::Arc::new(client));
                self.reviewing = false;
                println!("API key updated; starting a fresh session.");
            }
            Err(err) => println!("{}", err.friendly_message("Could not apply the key").red()),
        }
    }

    /// Prints the failure. Synthesis errors already left a friendly message
    /// on the session; guard rejections are usage feedback.
    async fn report(&self, err: FitroomError) {
        let session = self.stylist.session().await;
        match session.error {
            Some(message) => println!("{}", message.red()),
            None if err.is_invalid_state() => match session.state {
                SessionState::Empty => {
                    println!("{}", "No model yet. Use 'upload <photo-file>' first.".yellow())
                }
                _ => println!("{}", err.friendly_message("That is not possible right now").yellow()),
            },
            None => println!("{}", err.friendly_message("Something went wrong").red()),
        }
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/avif" => "avif",
        "image/heic" => "heic",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/unknown"), "png");
    }
}
