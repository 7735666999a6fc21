use std::fs;

use chrono::NaiveDate;
use status_board::config::{Config, PresentationConfig};
use status_board::presentation::{PresentationError, render_deck};
use status_board::report::generate_reports;
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn deck_is_built_from_a_generated_report() {
    let root = tempdir().unwrap();
    let projects = root.path().join("projects");
    fs::create_dir(&projects).unwrap();
    fs::write(
        projects.join("2025-03-03-infra.md"),
        "---\nid: infra-1\ntitle: Rack migration\nowner: Mei\nstatus: In-Progress\nstart_date: 2025-03-03\ndue_date: 2025-03-14\n---\n## 進度報告\n- 2025-03-04: see [ticket](https://tracker/1)\n",
    )
    .unwrap();
    generate_reports(root.path(), &Config::default(), d(2025, 3, 10)).unwrap();

    let report = root.path().join("people/Mei.md");
    let deck = render_deck(&report, &PresentationConfig::default(), d(2025, 3, 11)).unwrap();

    assert_eq!(deck.slide, root.path().join("people/Mei.slide.svg"));
    let image = deck.image.expect("dated project yields a gantt image");
    assert_eq!(image, root.path().join("people/Mei.gantt.png"));

    let png = image::open(&image).unwrap();
    assert_eq!(png.width(), 1200);

    let svg = fs::read_to_string(&deck.slide).unwrap();
    assert!(svg.contains(r#"href="data:image/png;base64,iVBORw0KGgo"#));
    assert!(!svg.contains("Mei.gantt.png"));
    assert_eq!(svg.matches("<image ").count(), 1);
    assert!(svg.contains("Generated: 2025-03-11"));
    assert!(svg.contains("Rack migration"));
    assert!(svg.contains("see ticket"));
    assert!(!svg.contains("https://tracker"));
    assert!(!svg.contains("Gantt generated on"));
}

#[test]
fn report_without_dated_projects_gives_a_text_only_slide() {
    let root = tempdir().unwrap();
    let people = root.path().join("people");
    fs::create_dir(&people).unwrap();
    let report = people.join("Ken.md");
    fs::write(
        &report,
        "# Ken\n\n## Gantt\n\n_No dated projects_\n\n_Gantt generated on 2025-03-10_\n\n## Pending\n\n- None\n",
    )
    .unwrap();

    let deck = render_deck(&report, &PresentationConfig::default(), d(2025, 3, 10)).unwrap();
    assert!(deck.image.is_none());
    let svg = fs::read_to_string(&deck.slide).unwrap();
    assert!(!svg.contains("<image"));
    assert!(svg.contains("<title>Ken</title>"));
    assert!(svg.contains(">Pending</text>"));
    assert!(!svg.contains("No dated projects"));
}

#[test]
fn missing_report_is_reported() {
    let root = tempdir().unwrap();
    let err = render_deck(
        &root.path().join("people/Nobody.md"),
        &PresentationConfig::default(),
        d(2025, 3, 10),
    )
    .unwrap_err();
    assert!(matches!(err, PresentationError::ReportNotFound(_)));
}
