use chrono::{NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use licwarden_core::{LicenseKey, VendorId};
use licwarden_licenses::{LicenseKind, NewLicense};
use licwarden_risk::{devices_at_risk, expiring_licenses, overused_licenses, LicenseUsage};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
}

fn fixture(count: usize) -> Vec<LicenseUsage> {
    (0..count)
        .map(|i| {
            let license = NewLicense {
                key: LicenseKey::from(format!("LIC-{i:05}")),
                software_name: format!("Package {i}"),
                vendor_id: VendorId::new(),
                valid_from: today() - chrono::Duration::days(365),
                valid_to: today() + chrono::Duration::days((i as i64 % 90) - 10),
                kind: LicenseKind::PerDevice,
                max_usage: (i as u32 % 16) + 1,
                notes: None,
                occurred_at: Utc::now(),
            }
            .build()
            .unwrap();
            LicenseUsage {
                assigned: i as u32 % 12,
                license,
            }
        })
        .collect()
}

fn bench_alert_lists(c: &mut Criterion) {
    let licenses = fixture(1000);

    c.bench_function("expiring_licenses_1000", |b| {
        b.iter(|| expiring_licenses(black_box(&licenses), today(), 30))
    });

    c.bench_function("overused_licenses_1000", |b| {
        b.iter(|| overused_licenses(black_box(&licenses), 75.0))
    });

    c.bench_function("devices_at_risk_empty", |b| {
        b.iter(|| devices_at_risk(black_box(&[]), today(), 15))
    });
}

criterion_group!(benches, bench_alert_lists);
criterion_main!(benches);
