use eframe::{NativeOptions, egui};
use protannot::app::ProtAnnotApp;
use std::env;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("protannot {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    // First non-flag argument: a session JSON or a PDB file.
    let session_path = args.iter().find(|a| !a.starts_with('-')).cloned();

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ProtAnnot",
        options,
        Box::new(move |_cc| Ok(Box::new(ProtAnnotApp::new(session_path.as_deref())))),
    )
}
