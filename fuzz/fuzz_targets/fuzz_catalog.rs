#![no_main]
use bioclock_core::{Catalog, ResolvedTimes, ResolverCfg};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Arbitrary dataset JSON must either fail to parse or resolve every profile cleanly.
    let Ok(catalog) = Catalog::from_json_str(data) else {
        return;
    };
    let cfg = ResolverCfg::default();
    for (key, _) in catalog.sorted_entries() {
        let profile = catalog.get(key);
        for route in profile.map(|p| p.available_routes()).unwrap_or_default() {
            let t = ResolvedTimes::resolve(profile, &route, &cfg);
            assert!(t.onset_minutes >= 0.0 && t.duration_minutes >= 0.0);
        }
        let _ = profile.map(|p| p.info());
    }
});
