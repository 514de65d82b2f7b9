use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use salary_atlas::analysis::flow::{quartile_node, track_node};
use salary_atlas::data::regions::UsStateLookup;
use salary_atlas::ingest::{PendingDataset, load_dataset};
use salary_atlas::{AtlasConfig, Coordinator, Quartile, SizeBucket, Skill, Track};

const POSTINGS: &str = "\
Job Title,Location,Salary Estimate,Size,Industry,Company Name,python_yn,R_yn,spark,aws,excel
Data Scientist,\"San Francisco, CA\",$90K-$110K (Glassdoor est.),51 to 200 employees,Internet,Hooli,1,1,0,0,0
Senior Data Engineer,\"San Jose, CA\",$130K-$150K (Glassdoor est.),10000+ employees,Internet,Globex,1,0,1,1,0
Data Analyst,\"Los Angeles, CA\",$55K-$65K (Glassdoor est.),201 to 500 employees,Retail,Initech,0,0,0,0,1
Machine Learning Engineer,\"Oakland, CA\",$150K-$170K (Glassdoor est.),-1,Internet,Umbrella,1,0,0,1,0
Data Scientist,\"New York, NY\",$80K-$100K (Glassdoor est.),1001 to 5000 employees,Finance,Vandelay,1,0,0,0,1
Data Scientist,Remote,$80K-$100K,-1,Finance,Nobody,1,0,0,0,0
";

async fn coordinator() -> Coordinator {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("postings.csv");
    std::fs::write(&path, POSTINGS).unwrap();
    let repo = load_dataset(&path, &AtlasConfig::default()).await.unwrap();
    Coordinator::new(std::sync::Arc::new(repo))
}

#[tokio::test]
async fn csv_to_region_views() {
    let mut c = coordinator().await;
    let report = c.repository().report();
    assert_eq!(report.rows_read, 6);
    assert_eq!(report.records_valid, 5);
    assert_eq!(report.dropped_missing_region, 1);

    // CA mean = (100 + 140 + 60 + 160) / 4 = 115k, NY = 90k.
    assert_eq!(c.national_median(), Some(102_500.0));

    assert!(c.select_feature("06", &UsStateLookup));
    let current = c.current();
    assert_eq!(current.views.record_count, 4);
    assert_eq!(current.views.skill_frequency.fraction(Skill::Python), 0.75);
    let buckets: Vec<SizeBucket> = current.views.size_stats.iter().map(|s| s.bucket).collect();
    assert_eq!(
        buckets,
        vec![
            SizeBucket::Small,
            SizeBucket::Medium,
            SizeBucket::Large,
            SizeBucket::Unknown
        ]
    );

    // CA salaries 60/100/140/160k: the analyst sits alone in Q1.
    let graph = &current.views.flow_graph;
    let analyst = track_node(Track::DataAnalyst).unwrap();
    assert_eq!(graph.link(analyst, quartile_node(Quartile::Q1)).unwrap().weight, 1);
    let ml = track_node(Track::MLEngineer).unwrap();
    assert_eq!(graph.link(ml, quartile_node(Quartile::Q4)).unwrap().weight, 1);
}

#[tokio::test]
async fn track_narrows_views_but_not_flow() {
    let mut c = coordinator().await;
    let changes = Rc::new(Cell::new(0));
    let counter = Rc::clone(&changes);
    c.on_selection_changed(move |_| counter.set(counter.get() + 1));

    c.select_region("CA");
    let region_graph = c.current().views.flow_graph.clone();
    c.select_track(Track::DataEngineer);

    let current = c.current();
    assert_eq!(current.views.record_count, 1);
    assert_eq!(current.views.skill_frequency.fraction(Skill::Spark), 1.0);
    assert_eq!(current.views.flow_graph, region_graph);
    assert_eq!(changes.get(), 2);

    let json = serde_json::to_value(&*current).unwrap();
    assert_eq!(json["state"]["selected_region"], "CA");
    assert_eq!(json["state"]["selected_track"], "DataEngineer");
    assert_eq!(json["views"]["flow_graph"]["nodes"].as_array().unwrap().len(), 13);
}

#[tokio::test]
async fn timed_out_load_is_fatal() {
    let pending = PendingDataset::spawn_with("never", || {
        std::thread::sleep(Duration::from_millis(200));
        anyhow::bail!("too late anyway")
    });
    let result = Coordinator::from_pending(pending, Duration::from_millis(10)).await;
    assert!(matches!(
        result,
        Err(salary_atlas::IngestError::Timeout { .. })
    ));
}
