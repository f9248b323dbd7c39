use chrono::{Duration, NaiveDate};

use fresh_digest::history::{HashRecord, HistoryStore, MemoryHistory};
use fresh_digest::penalty::{penalty, rank_sources};
use fresh_digest::ContentItem;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
}

#[test]
fn featured_source_ranks_after_fresh_one() {
    let mut store = MemoryHistory::new();
    for (i, days_ago) in [0, 2, 6].into_iter().enumerate() {
        let item = ContentItem::new(format!("Foo story {i}"), "s")
            .with_link(format!("https://foo.test/{i}"))
            .with_source("Foo")
            .dated(today() - Duration::days(days_ago));
        store.append(&item).unwrap();
    }
    let records = store.hash_records();
    assert_eq!(penalty("Foo", &records, 7, today()), 3);
    assert_eq!(penalty("Bar", &records, 7, today()), 0);

    let groups = vec![("Foo".to_string(), "foo items"), ("Bar".to_string(), "bar items")];
    let ranked = rank_sources(groups, &records, 7, today());
    let order: Vec<&str> = ranked.iter().map(|(p, _)| p.source.as_str()).collect();
    assert_eq!(order, vec!["Bar", "Foo"]);
    assert_eq!(ranked[1].0.count_in_window, 3);
}

#[test]
fn old_records_fall_out_of_the_window() {
    let records = vec![HashRecord {
        hash: "h".into(),
        source: "Foo".into(),
        date: today() - Duration::days(8),
    }];
    assert_eq!(penalty("Foo", &records, 7, today()), 0);
    assert_eq!(penalty("Foo", &records, 8, today()), 1);
}
