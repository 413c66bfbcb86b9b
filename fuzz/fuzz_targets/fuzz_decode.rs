#![no_main]

use libfuzzer_sys::fuzz_target;

use vigil_codec::layout::min_len;
use vigil_codec::{decode, encode};
use vigil_types::AccountKind;

fuzz_target!(|data: &[u8]| {
    for kind in AccountKind::ALL {
        match decode(kind, data) {
            Ok(state) => {
                assert!(data.len() >= min_len(kind));
                assert_eq!(state.kind(), kind);

                // Re-encoding over the same bytes decodes to the same state.
                let mut copy = data.to_vec();
                encode(&state, &mut copy);
                assert_eq!(decode(kind, &copy).ok(), Some(state));
            }
            Err(_) => assert!(data.len() < min_len(kind)),
        }
    }
});
