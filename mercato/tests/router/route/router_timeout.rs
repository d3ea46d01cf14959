use std::time::Duration;

use mercato::{DataType, MercatoError, Params};
use mercato_mock::MockBehavior;

use crate::helpers::{builder, doc, mock, tried};

#[tokio::test(start_paused = true)]
async fn hanging_provider_times_out_and_falls_back() {
    let (a, _) = mock("A", DataType::News, MockBehavior::Hang);
    let (b, _) = mock("B", DataType::News, MockBehavior::Return("headline".into()));
    let mercato = builder(doc(DataType::News, &[("A", 1), ("B", 2)]), &[a, b])
        .provider_timeout(Duration::from_millis(500))
        .build()
        .unwrap();

    let r = mercato.route(DataType::News, &Params::new()).await;

    assert!(r.success);
    assert_eq!(tried(&r), vec!["A", "B"]);
    assert_eq!(
        r.metadata.errors,
        vec![MercatoError::provider_timeout("A", DataType::News)]
    );
    assert!(r.metadata.elapsed >= Duration::from_millis(500));

    let a_stat = mercato.performance_stat("A").unwrap();
    assert_eq!(a_stat.total_requests, 1);
    assert_eq!(a_stat.successful_requests, 0);
    assert_eq!(a_stat.total_latency, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn slow_provider_within_timeout_succeeds_with_measured_latency() {
    let (a, _) = mock(
        "A",
        DataType::News,
        MockBehavior::Delay(Duration::from_millis(300), "late headline".into()),
    );
    let mercato = builder(doc(DataType::News, &[("A", 1)]), &[a])
        .provider_timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let r = mercato.route(DataType::News, &Params::new()).await;

    assert!(r.success);
    let latency = r.metadata.platform_elapsed.unwrap();
    assert!(latency >= Duration::from_millis(300));
    assert_eq!(
        mercato.performance_stat("A").unwrap().average_latency(),
        Some(latency)
    );
}
