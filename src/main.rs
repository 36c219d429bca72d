//! docx-oxml - inspect document notes and embedded images

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use docx_oxml::image::{Emu, Image, ImageAttributes, ImageFormat};
use docx_oxml::{Document, DocumentPart, NoteKind, NoteResolver, NotesPart, PartKind};

#[derive(Parser)]
#[command(name = "docx-oxml")]
#[command(version, about = "Inspect WordprocessingML notes and images", long_about = None)]
#[command(after_help = "EXAMPLES:
    docx-oxml image media/image1.png
    docx-oxml notes word/document.xml --footnotes word/footnotes.xml
    docx-oxml notes word/document.xml --endnotes word/endnotes.xml --json

Set RUST_LOG=debug for diagnostics.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify an image and print its size and resolution
    Image {
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print every note reference with its resolved text
    Notes {
        /// The main document part (word/document.xml)
        #[arg(value_name = "DOCUMENT_XML")]
        document: PathBuf,

        /// The footnotes part (word/footnotes.xml)
        #[arg(long, value_name = "XML")]
        footnotes: Option<PathBuf>,

        /// The endnotes part (word/endnotes.xml)
        #[arg(long, value_name = "XML")]
        endnotes: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ImageReport<'a> {
    filename: Option<&'a str>,
    format: ImageFormat,
    content_type: &'static str,
    ext: &'a str,
    px_width: u32,
    px_height: u32,
    horz_dpi: u32,
    vert_dpi: u32,
    width: Emu,
    height: Emu,
    sha1: String,
    attrs: &'a ImageAttributes,
}

#[derive(Serialize)]
struct NoteReport {
    kind: NoteKind,
    part: &'static str,
    id: Option<String>,
    text: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Image { path, json } => show_image(&path, json),
        Command::Notes {
            document,
            footnotes,
            endnotes,
            json,
        } => show_notes(&document, footnotes.as_deref(), endnotes.as_deref(), json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_image(path: &Path, json: bool) -> Result<(), String> {
    let image = Image::from_file(path).map_err(|e| e.to_string())?;
    let report = ImageReport {
        filename: image.filename(),
        format: image.format(),
        content_type: image.content_type(),
        ext: image.ext(),
        px_width: image.px_width(),
        px_height: image.px_height(),
        horz_dpi: image.horz_dpi(),
        vert_dpi: image.vert_dpi(),
        width: image.width(),
        height: image.height(),
        sha1: image.sha1(),
        attrs: image.attrs(),
    };

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    println!("File: {}", path.display());
    println!("Format: {:?} ({})", report.format, report.content_type);
    println!("Pixels: {}x{}", report.px_width, report.px_height);
    println!("DPI: {}x{}", report.horz_dpi, report.vert_dpi);
    println!(
        "Size: {:.2}in x {:.2}in",
        report.width.inches(),
        report.height.inches()
    );
    for (key, value) in report.attrs.iter() {
        println!("{key}: {value}");
    }
    println!("SHA1: {}", report.sha1);
    Ok(())
}

fn show_notes(
    document: &Path,
    footnotes: Option<&Path>,
    endnotes: Option<&Path>,
    json: bool,
) -> Result<(), String> {
    let doc = load_document(document, footnotes, endnotes).map_err(|e| e.to_string())?;

    let mut resolver = NoteResolver::new();
    let mut reports = Vec::new();
    for reference in doc.note_references().map_err(|e| e.to_string())? {
        let paragraphs = resolver
            .resolve(&doc, &reference)
            .map_err(|e| e.to_string())?;
        let lines = paragraphs
            .iter()
            .map(|p| p.text(&doc))
            .collect::<docx_oxml::Result<Vec<_>>>()
            .map_err(|e| e.to_string())?;
        reports.push(NoteReport {
            kind: reference.kind(),
            part: PartKind::Notes(reference.kind()).part_name(),
            id: reference.raw_id().map(str::to_string),
            text: lines.join("\n"),
        });
    }

    if json {
        let out = serde_json::to_string_pretty(&reports).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    if reports.is_empty() {
        println!("No note references.");
    }
    for report in &reports {
        println!(
            "[{} {} in {}] {}",
            report.kind,
            report.id.as_deref().unwrap_or("?"),
            report.part,
            report.text
        );
    }
    Ok(())
}

fn load_document(
    document: &Path,
    footnotes: Option<&Path>,
    endnotes: Option<&Path>,
) -> docx_oxml::Result<Document> {
    let mut doc = Document::new(DocumentPart::from_xml(&fs::read(document)?)?);
    for (kind, path) in [(NoteKind::Footnote, footnotes), (NoteKind::Endnote, endnotes)] {
        if let Some(path) = path {
            doc.set_notes_part(NotesPart::from_xml(kind, &fs::read(path)?)?);
        }
    }
    Ok(doc)
}
