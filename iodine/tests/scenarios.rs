use iodine::Store;

fn two_nodes() -> (Store, u32) {
    let mut s = Store::new();
    let n = s.new_network("n1").unwrap();
    s.add_node(n, "A", 0.0, 0.0, 10.0, 10.0, true, false).unwrap();
    s.add_node(n, "B", 20.0, 20.0, 10.0, 10.0, true, false).unwrap();
    (s, n)
}

#[test]
fn reaction_lists_its_participants() {
    let (mut s, n) = two_nodes();
    let r = s.create_reaction(n, "r1", &[0], &[1]).unwrap();
    assert_eq!(r, 0);
    assert_eq!(s.get_list_of_reaction_src_nodes(n, r).unwrap(), vec![0]);
    assert_eq!(s.get_list_of_reaction_dest_nodes(n, r).unwrap(), vec![1]);
    assert_eq!(s.get_reaction_src_node_stoich(n, r, 0).unwrap(), 1.0);
    assert_eq!(s.get_reaction_dest_node_stoich(n, r, 1).unwrap(), 1.0);
    assert_eq!(s.get_src_reactions(n, 0).unwrap(), vec![r]);
    assert_eq!(s.get_dest_reactions(n, 1).unwrap(), vec![r]);
}

#[test]
fn wired_node_cannot_be_deleted() {
    let (mut s, n) = two_nodes();
    s.create_reaction(n, "r1", &[0], &[1]).unwrap();
    let e = s.delete_node(n, 0).unwrap_err();
    assert_eq!(e.code(), -4);
    assert!(!e.is_value());

    s.delete_reaction(n, 0).unwrap();
    s.delete_node(n, 0).unwrap();
    assert_eq!(s.get_list_of_node_ids(n).unwrap(), vec!["B".to_string()]);
    assert_eq!(s.get_list_of_node_indices(n).unwrap(), vec![1]);
}

#[test]
fn compartment_takes_node_out_of_base() {
    let (mut s, n) = two_nodes();
    let c = s.add_compartment(n, "c1", 0.0, 0.0, 100.0, 100.0).unwrap();
    assert_eq!(c, 0);
    assert_eq!(s.get_nodes_in_compartment(n, None).unwrap(), vec![0, 1]);
    s.set_compartment_of_node(n, 1, Some(c)).unwrap();
    assert_eq!(s.get_nodes_in_compartment(n, None).unwrap(), vec![0]);
    assert_eq!(s.get_nodes_in_compartment(n, Some(c)).unwrap(), vec![1]);
    assert_eq!(s.get_compartment_of_node(n, 1).unwrap(), Some(c));
    s.validate_state().unwrap();
}

#[test]
fn undo_and_redo_one_node() {
    let mut s = Store::new();
    assert_eq!(s.undo().unwrap_err().code(), -9);
    let n = s.new_network("n1").unwrap();
    s.add_node(n, "A", 0.0, 0.0, 10.0, 10.0, true, false).unwrap();
    s.undo().unwrap();
    assert_eq!(s.get_number_of_nodes(n).unwrap(), 0);
    s.redo().unwrap();
    assert_eq!(s.get_number_of_nodes(n).unwrap(), 1);
    assert_eq!(s.get_node_id(n, 0).unwrap(), "A");
}
