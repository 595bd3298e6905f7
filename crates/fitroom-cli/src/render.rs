//! Terminal rendering of session snapshots.

use colored::Colorize;
use fitroom_core::garment::Wardrobe;
use fitroom_core::pose;
use fitroom_core::session::OutfitSession;

/// Prints the outfit stack, top layer last, the way it is layered.
pub fn render_stack(session: &OutfitSession) {
    if session.history.is_empty() {
        println!("{}", "No model yet. Use 'upload <photo>' to get started.".dimmed());
        return;
    }
    println!("{}", "Outfit stack:".bold());
    for (index, layer) in session.history.iter().enumerate() {
        let marker = if index == session.history.len() - 1 { "->" } else { "  " };
        let name = if layer.is_base() {
            layer.display_name().italic().to_string()
        } else {
            layer.display_name().to_string()
        };
        let poses = layer
            .pose_images
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        println!("{marker} {}. {name} {}", index + 1, format!("[poses: {poses}]").dimmed());
    }
}

/// Prints the pose selector: current pose highlighted, cached poses marked.
pub fn render_poses(session: &OutfitSession) {
    let available = session.available_pose_names();
    println!("{}", "Poses:".bold());
    for (index, pose) in pose::POSES.iter().enumerate() {
        let cached = available.iter().any(|name| name == pose.name);
        let label = if index == session.current_pose_index {
            format!("* {}", pose.name).green().to_string()
        } else if cached {
            format!("  {}", pose.name).normal().to_string()
        } else {
            format!("  {}", pose.name).dimmed().to_string()
        };
        println!("{label}  {}", pose.instruction.dimmed());
    }
}

/// Prints the wardrobe with garment ids the `wear` command accepts.
pub fn render_wardrobe(wardrobe: &Wardrobe) {
    println!("{}", "Wardrobe:".bold());
    for garment in wardrobe.garments() {
        println!("  {}  {}", garment.id.cyan(), garment.name);
    }
}

/// Prints the session's status line: state, pose, any pending error.
pub fn render_status(session: &OutfitSession) {
    println!(
        "state: {}  pose: {}  layers: {}",
        session.state.to_string().bold(),
        session.current_pose_name(),
        session.history.len()
    );
    if let Some(error) = &session.error {
        println!("{}", error.red());
    }
}
