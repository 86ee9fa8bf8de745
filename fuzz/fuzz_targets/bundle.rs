#![no_main]

use libfuzzer_sys::fuzz_target;
use scriptsuite_rs::bundle;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    // The bundle parser should never panic
    let result = bundle::parse(&input);

    if let Ok(ref scripts) = result {
        for script in scripts {
            assert!(!script.name.is_empty(), "Empty script name");
        }
    }

    // Same input, same scripts
    let again = bundle::parse(&input);
    match (&result, &again) {
        (Ok(first), Ok(second)) => assert_eq!(first, second, "Bundle parser is not deterministic"),
        (Err(_), Err(_)) => {}
        _ => panic!("Bundle parser is not deterministic - one call succeeded, other failed"),
    }
});
