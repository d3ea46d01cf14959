use std::sync::Arc;

use mercato::{DataConfig, DataConnector, DataType, Params, PlatformSettings};
use mercato_mock::{MockBehavior, MockConnector};
use proptest::prelude::*;

const NAMES: [&str; 6] = ["p0", "p1", "p2", "p3", "p4", "p5"];

proptest! {
    #[test]
    fn untested_candidates_sort_by_priority_then_source_order(
        priorities in proptest::collection::vec(0i64..4, 1..=6),
    ) {
        let names = &NAMES[..priorities.len()];
        let mut doc = DataConfig::default();
        doc.platform_preferences
            .insert(DataType::News, names.iter().map(|n| (*n).to_string()).collect());
        let mut connectors: Vec<Arc<dyn DataConnector>> = Vec::new();
        for (n, prio) in names.iter().zip(&priorities) {
            doc.platform_settings
                .insert((*n).to_string(), PlatformSettings::new(*prio, Params::new()));
            connectors.push(Arc::new(
                MockConnector::new(n).serve(DataType::News, MockBehavior::Return("x".into())),
            ));
        }
        let mercato = crate::helpers::router(doc, &connectors);

        let mut expected: Vec<(i64, usize)> =
            priorities.iter().copied().zip(0..priorities.len()).collect();
        expected.sort();
        let expected: Vec<String> = expected.into_iter().map(|(_, i)| names[i].to_string()).collect();

        let ranked = mercato.rankings(DataType::News);
        prop_assert_eq!(&ranked, &expected);
        prop_assert_eq!(mercato.best_platform(DataType::News), expected.first().cloned());
    }
}
