mod util;

use maplit::btreeset;
use std::sync::Arc;
use std::thread;
use util::*;
use vcx_exchange::prelude::*;

const CRED_DEF_ID: &str = "V4SGRU86Z58d6TV7PBUe6f:3:CL:V4SGRU86Z58d6TV7PBUe6f:2:FaberVcx:1.0:tag1";

fn registry() -> RevocationRegistry {
    RevocationRegistry::new(CRED_DEF_ID, Arc::new(FileTailsStorage))
}

#[test]
fn revoke_is_idempotent() {
    setup();
    let registry = registry();
    let handle = registry.create(&tails_dir(), 5).unwrap();
    let index = registry.allocate_index(&handle).unwrap();
    assert_eq!(index, 0);

    let status = registry.revoke(&handle, index).unwrap().unwrap();
    assert_eq!(status.seq_no, 2);
    assert!(registry.revoke(&handle, index).unwrap().is_none());
    assert!(registry.is_revoked(&handle, index).unwrap());
    assert_eq!(registry.status_history(&handle).unwrap().len(), 2);
    assert_eq!(registry.latest_status(&handle).unwrap(), status);
}

#[test]
fn revoked_set_only_grows() {
    setup();
    let registry = registry();
    let handle = registry.create(&tails_dir(), 5).unwrap();
    let mut previous = btreeset! {};
    for index in [3, 0, 3, 4, 0] {
        registry.revoke(&handle, index).unwrap();
        let revoked = registry.revoked_indices(&handle).unwrap();
        assert!(revoked.is_superset(&previous));
        previous = revoked;
    }
    assert_eq!(previous, btreeset! {0, 3, 4});
    let history = registry.status_history(&handle).unwrap();
    assert_eq!(
        history.iter().map(|s| s.seq_no).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn rotation_keeps_older_generations() {
    setup();
    let dir = tails_dir();
    let registry = registry();
    let first = registry.create(&dir, 2).unwrap();
    let index = registry.allocate_index(&first).unwrap();
    registry.revoke(&first, index).unwrap();

    let second = registry.rotate(&dir, 3).unwrap();
    assert_ne!(first.rev_reg_id, second.rev_reg_id);
    assert_eq!(registry.active().unwrap(), Some(second.clone()));
    assert_eq!(registry.handle_for(&first.rev_reg_id).unwrap(), first);

    assert!(registry.is_revoked(&first, index).unwrap());
    assert!(!registry.is_revoked(&second, index).unwrap());
    assert_eq!(registry.remaining_capacity(&first).unwrap(), 0);
    assert_eq!(registry.remaining_capacity(&second).unwrap(), 3);
    assert!(matches!(
        registry.allocate_index(&first),
        Err(Error::Configuration(_))
    ));

    let state = registry.registry_state().unwrap();
    assert!(state.contains(&first.rev_reg_id));
    assert!(state.contains(&second.rev_reg_id));
    assert_eq!(state.latest(&first.rev_reg_id).unwrap().seq_no, 2);
    assert_eq!(
        state.definition(&second.rev_reg_id).unwrap().max_creds,
        3
    );
    let tails = FileTailsStorage
        .read_tails(std::path::Path::new(
            &registry.definition(&second).unwrap().tails_location,
        ))
        .unwrap();
    assert_eq!(tails.max_creds, 3);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn concurrent_revokes_end_in_their_union() {
    setup();
    let registry = Arc::new(registry());
    let handle = registry.create(&tails_dir(), 16).unwrap();
    let workers: Vec<_> = (0..4u32)
        .map(|w| {
            let registry = registry.clone();
            let handle = handle.clone();
            thread::spawn(move || {
                for index in (w * 3)..(w * 3 + 4) {
                    registry.revoke(&handle, index).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    let revoked = registry.revoked_indices(&handle).unwrap();
    assert_eq!(revoked, (0..13).collect());
    // one status per distinct index plus the initial one
    assert_eq!(registry.status_history(&handle).unwrap().len(), 14);
}

#[test]
fn exhausted_registry_rejects_allocation() {
    setup();
    let registry = registry();
    let handle = registry.create(&tails_dir(), 2).unwrap();
    assert_eq!(registry.allocate_index(&handle).unwrap(), 0);
    assert_eq!(registry.allocate_index(&handle).unwrap(), 1);
    assert_eq!(registry.remaining_capacity(&handle).unwrap(), 0);
    assert_eq!(
        registry.allocate_index(&handle),
        Err(Error::RegistryExhausted {
            rev_reg_id: handle.rev_reg_id.clone(),
            max_creds: 2,
        })
    );
}

#[test]
fn index_beyond_capacity_is_rejected() {
    setup();
    let registry = registry();
    let handle = registry.create(&tails_dir(), 5).unwrap();
    assert_eq!(
        registry.revoke(&handle, 5),
        Err(Error::IndexOutOfRange {
            index: 5,
            max_creds: 5
        })
    );
    assert!(registry.revoked_indices(&handle).unwrap().is_empty());
}

#[test]
fn registry_lifecycle_is_checked() {
    setup();
    let dir = tails_dir();
    let registry = registry();
    assert!(matches!(
        registry.rotate(&dir, 5),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        registry.create(&dir, 0),
        Err(Error::Configuration(_))
    ));
    assert_eq!(registry.active().unwrap(), None);
    registry.create(&dir, 5).unwrap();
    assert!(matches!(
        registry.create(&dir, 5),
        Err(Error::Configuration(_))
    ));
}
