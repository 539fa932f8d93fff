#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use md_reader::ReaderApp;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "md-reader")]
#[command(about = "A local-first markdown reader", long_about = None)]
struct Args {
    /// Markdown files to import at startup
    files: Vec<PathBuf>,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([500.0, 300.0])
            .with_title("Markdown Reader")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "md-reader",
        options,
        Box::new(move |cc| Ok(Box::new(ReaderApp::new(cc, args.files)))),
    )
}
