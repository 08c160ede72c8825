use super::*;
use crate::geometry::HAlign;
use crate::render::CaptionAlignment;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const EPS: f64 = 1e-6;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Begin(Option<String>),
    Title(Rect, String),
    Place(Rect, ResolvedItem, Option<f64>),
    Label(Rect, String, HAlign),
    End,
}

#[derive(Default)]
struct RecordingRenderer {
    events: Vec<Event>,
}

impl Renderer for RecordingRenderer {
    fn begin_slide(&mut self, notes: Option<&str>) -> Result<()> {
        self.events.push(Event::Begin(notes.map(str::to_string)));
        Ok(())
    }

    fn title(&mut self, rect: Rect, text: &str) -> Result<()> {
        self.events.push(Event::Title(rect, text.to_string()));
        Ok(())
    }

    fn place(
        &mut self,
        rect: Rect,
        item: &ResolvedItem,
        _alignment: Alignment,
        fontsize: Option<f64>,
    ) -> Result<()> {
        self.events.push(Event::Place(rect, item.clone(), fontsize));
        Ok(())
    }

    fn label(&mut self, rect: Rect, text: &str, alignment: HAlign) -> Result<()> {
        self.events.push(Event::Label(rect, text.to_string(), alignment));
        Ok(())
    }

    fn end_slide(&mut self) -> Result<()> {
        self.events.push(Event::End);
        Ok(())
    }
}

fn create_pictures(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"not really a picture").expect("Failed to write fixture");
    }
}

fn pattern(dir: &Path, glob: &str) -> ContentSpec {
    ContentSpec::parse(&format!("{}/{}", dir.display(), glob))
}

fn report(slides: Vec<SlideSpec>) -> ReportSpec {
    ReportSpec {
        slides,
        ..ReportSpec::default()
    }
}

fn places(events: &[Event]) -> Vec<Rect> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Place(rect, _, _) => Some(*rect),
            _ => None,
        })
        .collect()
}

#[test]
fn test_grid_boxes_reach_the_renderer_in_order() {
    let spec = SlideSpec {
        content: vec![
            ContentSpec::text("one"),
            ContentSpec::text("two"),
            ContentSpec::text("three"),
        ],
        ..SlideSpec::default()
    };

    let mut renderer = RecordingRenderer::default();
    let plan = build(&report(vec![spec]), None, &mut renderer, &mut Diagnostics::new()).unwrap();
    assert_eq!(plan.slides.len(), 1);

    assert_eq!(renderer.events.first(), Some(&Event::Begin(None)));
    assert_eq!(renderer.events.last(), Some(&Event::End));

    let rects = places(&renderer.events);
    assert_eq!(rects.len(), 3);
    // 25.4 x 19.05 slide, 2 cm margins, 1 cm gaps, two columns and two rows
    assert!(close(rects[0].x, 2.0) && close(rects[0].y, 2.0));
    assert!(close(rects[0].width, 10.2) && close(rects[0].height, 7.025));
    assert!(close(rects[1].x, 13.2) && close(rects[1].y, 2.0));
    assert!(close(rects[2].x, 2.0) && close(rects[2].y, 10.025));
}

#[test]
fn test_title_moves_content_down() {
    let spec = SlideSpec {
        title: Some("Results".to_string()),
        content: vec![ContentSpec::text("only")],
        ..SlideSpec::default()
    };

    let mut renderer = RecordingRenderer::default();
    build(&report(vec![spec]), None, &mut renderer, &mut Diagnostics::new()).unwrap();

    let title = renderer
        .events
        .iter()
        .find_map(|e| match e {
            Event::Title(rect, text) => Some((*rect, text.clone())),
            _ => None,
        })
        .expect("title was not rendered");
    assert_eq!(title.1, "Results");
    assert!(close(title.0.y, 2.0) && close(title.0.height, 3.5));

    let rects = places(&renderer.events);
    assert!(close(rects[0].y, 5.5) && close(rects[0].height, 11.55));
}

#[test]
fn test_filename_caption_takes_top_of_picture_box() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    create_pictures(dir.path(), &["cat.png", "dog.png"]);

    let spec = SlideSpec {
        content: vec![pattern(dir.path(), "*.png"), ContentSpec::text("caption-free")],
        style: BoxStyle {
            show_filename: FilenameDisplay::Filename,
            filename_alignment: CaptionAlignment::All(HAlign::Left),
            fontsize: Some(12.0),
        },
        ..SlideSpec::default()
    };

    let mut renderer = RecordingRenderer::default();
    build(&report(vec![spec]), None, &mut renderer, &mut Diagnostics::new()).unwrap();

    let labels: Vec<(Rect, String, HAlign)> = renderer
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Label(rect, text, align) => Some((*rect, text.clone(), *align)),
            _ => None,
        })
        .collect();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].1, "cat");
    assert_eq!(labels[1].1, "dog");
    assert_eq!(labels[0].2, HAlign::Left);

    // 10% of a 7.025 cm box is below the minimum strip
    assert!(close(labels[0].0.height, 0.8056));
    let rects = places(&renderer.events);
    assert!(close(rects[0].y, 2.0 + 0.8056));
    assert!(close(rects[0].height, 7.025 - 0.8056));
    // text boxes keep their full box
    assert!(close(rects[2].height, 7.025));

    let fontsizes: Vec<Option<f64>> = renderer
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Place(_, _, size) => Some(*size),
            _ => None,
        })
        .collect();
    assert!(fontsizes.iter().all(|s| *s == Some(12.0)));
}

#[test]
fn test_errors_name_the_directive() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let good = SlideSpec {
        content: vec![ContentSpec::text("fine")],
        ..SlideSpec::default()
    };
    let missing = SlideSpec {
        content: vec![pattern(dir.path(), "absent*.png")],
        ..SlideSpec::default()
    };

    let err = lay_out(&report(vec![good, missing]), None, &mut Diagnostics::new()).unwrap_err();
    match err {
        ReportError::InSlide { slide, source } => {
            assert_eq!(slide, 2);
            assert!(matches!(*source, ReportError::NotFound { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_ratio_mismatch_is_fatal() {
    let spec = SlideSpec {
        content: vec![ContentSpec::text("a"), ContentSpec::text("b")],
        layout: LayoutSpec {
            width_ratios: Some(vec![1.0, 2.0, 3.0]),
            ..LayoutSpec::default()
        },
        ..SlideSpec::default()
    };
    let err = lay_out(&report(vec![spec]), None, &mut Diagnostics::new()).unwrap_err();
    assert!(err.to_string().contains("width_ratios"));
}

#[test]
fn test_plan_collects_warnings_and_numbers_slides() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    create_pictures(dir.path(), &["img1.png", "img2.png", "img10.png"]);

    let split = SlideSpec {
        content: vec![pattern(dir.path(), "img*.png")],
        split: Split::Chunks(2),
        ..SlideSpec::default()
    };
    let missing = SlideSpec {
        content: vec![pattern(dir.path(), "none*.png")],
        missing_file: MissingPolicy::Empty,
        ..SlideSpec::default()
    };

    let mut diagnostics = Diagnostics::new();
    let plan = lay_out(&report(vec![split, missing]), None, &mut diagnostics).unwrap();

    let numbers: Vec<(usize, usize)> = plan.slides.iter().map(|s| (s.number, s.directive)).collect();
    assert_eq!(numbers, vec![(1, 1), (2, 1), (3, 2)]);

    let first: Vec<String> = plan.slides[0]
        .boxes
        .iter()
        .filter_map(|b| b.item.as_path())
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(first, vec!["img1.png", "img2.png"]);

    assert_eq!(plan.warnings.len(), 1);
    assert_eq!(plan.warnings[0].kind, WarningKind::NoMatch);
    assert!(matches!(plan.slides[2].boxes[0].item, ResolvedItem::Empty { .. }));
}

#[test]
fn test_notes_are_passed_to_the_renderer() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let notes_file = dir.path().join("notes.txt");
    fs::write(&notes_file, "Read me aloud").expect("Failed to write notes");

    let spec = SlideSpec {
        content: vec![ContentSpec::text("body")],
        notes: Some(Notes(vec![
            "First".to_string(),
            notes_file.to_string_lossy().into_owned(),
        ])),
        ..SlideSpec::default()
    };

    let mut renderer = RecordingRenderer::default();
    build(&report(vec![spec]), None, &mut renderer, &mut Diagnostics::new()).unwrap();
    assert_eq!(
        renderer.events[0],
        Event::Begin(Some("First\nRead me aloud".to_string()))
    );
}

#[test]
fn test_plan_serializes_to_json() {
    let spec = SlideSpec {
        title: Some("Numbers".to_string()),
        content: vec![ContentSpec::text("42")],
        ..SlideSpec::default()
    };
    let plan = lay_out(&report(vec![spec]), None, &mut Diagnostics::new()).unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["slides"][0]["title"]["text"], "Numbers");
    assert_eq!(json["slides"][0]["boxes"][0]["item"]["type"], "text");
    assert_eq!(json["slides"][0]["boxes"][0]["item"]["value"], "42");
    assert_eq!(json["slides"][0]["boxes"][0]["alignment"], "center center");
}
