use crate::fog::{DeviceId, DeviceSpec, Topology, TopologyError};
use crate::sim::SimTime;

/// cloud
/// ├── proxy
/// │   ├── gw-a
/// │   └── gw-b
/// └── edge
fn tree() -> Topology {
    let mut t = Topology::default();
    for spec in [
        DeviceSpec::new("cloud", 1000.0),
        DeviceSpec::new("proxy", 500.0).with_parent("cloud", 1),
        DeviceSpec::new("gw-a", 100.0).with_parent("proxy", 2),
        DeviceSpec::new("gw-b", 100.0).with_parent("proxy", 2),
        DeviceSpec::new("edge", 100.0).with_parent("cloud", 1),
    ] {
        t.add_device(&spec, SimTime::ZERO).expect("add device");
    }
    t
}

#[test]
fn next_hop_goes_down_into_the_subtree_or_up_to_the_parent() {
    let t = tree();
    let id = |n: &str| t.lookup(n).expect("device");

    assert_eq!(t.root(), Some(id("cloud")));
    assert_eq!(t.next_hop(id("cloud"), id("gw-b")), Some(id("proxy")));
    assert_eq!(t.next_hop(id("proxy"), id("gw-b")), Some(id("gw-b")));
    assert_eq!(t.next_hop(id("gw-a"), id("gw-b")), Some(id("proxy")));
    assert_eq!(t.next_hop(id("gw-a"), id("edge")), Some(id("proxy")));
    assert_eq!(t.next_hop(id("proxy"), id("edge")), Some(id("cloud")));
    assert_eq!(t.next_hop(id("edge"), id("edge")), None);
}

#[test]
fn path_lists_every_hop() {
    let t = tree();
    let id = |n: &str| t.lookup(n).expect("device");
    assert_eq!(
        t.path(id("gw-a"), id("edge")),
        Some(vec![id("gw-a"), id("proxy"), id("cloud"), id("edge")])
    );
    assert_eq!(t.path(id("gw-a"), DeviceId(99)), None);
}

#[test]
fn children_are_recorded_on_the_parent() {
    let t = tree();
    let proxy = t.device(t.lookup("proxy").expect("proxy"));
    assert_eq!(proxy.children().len(), 2);
    assert_eq!(proxy.level(), 1);
    assert_eq!(proxy.parent(), t.lookup("cloud"));
}

#[test]
fn tree_construction_errors() {
    let mut t = tree();
    assert_eq!(
        t.add_device(&DeviceSpec::new("cloud", 1.0), SimTime::ZERO),
        Err(TopologyError::DuplicateDevice("cloud".into()))
    );
    assert!(matches!(
        t.add_device(&DeviceSpec::new("x", 1.0).with_parent("nowhere", 3), SimTime::ZERO),
        Err(TopologyError::UnknownParent { .. })
    ));
    assert!(matches!(
        t.add_device(&DeviceSpec::new("x", 1.0).with_parent("proxy", 1), SimTime::ZERO),
        Err(TopologyError::LevelOrder { .. })
    ));
    assert!(matches!(
        t.add_device(&DeviceSpec::new("other-root", 1.0), SimTime::ZERO),
        Err(TopologyError::MultipleRoots { .. })
    ));
    assert!(matches!(
        t.add_device(&DeviceSpec::new("x", 0.0).with_parent("cloud", 1), SimTime::ZERO),
        Err(TopologyError::InvalidCapacity { .. })
    ));
    assert!(matches!(
        t.add_device(
            &DeviceSpec::new("x", 1.0).with_parent("cloud", 1).with_pes(vec![]),
            SimTime::ZERO
        ),
        Err(TopologyError::InvalidCapacity { .. })
    ));
    assert!(matches!(
        t.add_device(
            &DeviceSpec::new("x", 1.0).with_parent("cloud", 1).with_bandwidth(0.0, 1.0),
            SimTime::ZERO
        ),
        Err(TopologyError::InvalidCapacity { .. })
    ));
    // Failed additions leave the tree untouched.
    assert_eq!(t.len(), 5);
}
