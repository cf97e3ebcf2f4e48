#![no_main]
use bioclock_core::resolver::{TimeField, parse_range, resolve};
use bioclock_core::substance::FormattedField;
use bioclock_core::{ResolverCfg, SubstanceProfile};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (&str, &str, &str, &str)| {
    let (name, value, unit, route) = input;
    if let Some(v) = parse_range(value) {
        assert!(v.is_finite());
    }
    let field = FormattedField {
        value: value.to_string(),
        unit: unit.to_string(),
    };
    let mut profile = SubstanceProfile::new(name);
    profile.formatted_onset = Some(field.clone());
    profile.formatted_duration = Some(field);
    let cfg = ResolverCfg::default();
    for f in [TimeField::Onset, TimeField::Duration] {
        let minutes = resolve(&profile, f, route, &cfg);
        assert!(minutes.is_finite() && minutes >= 0.0);
    }
});
