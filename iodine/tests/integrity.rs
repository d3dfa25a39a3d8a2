use iodine::shape::{FontFamily, PropertyValue};
use iodine::{Color, Store, TipStyle, Vec2};

fn net_with(ids: &[&str]) -> (Store, u32) {
    let mut s = Store::new();
    let n = s.new_network("net").unwrap();
    for (i, id) in ids.iter().enumerate() {
        s.add_node(n, id, 100.0 * i as f64, 0.0, 50.0, 30.0, true, false).unwrap();
    }
    (s, n)
}

#[test]
fn indices_are_never_reused() {
    let (mut s, n) = net_with(&["A", "B", "C"]);
    s.delete_node(n, 1).unwrap();
    let d = s.add_node(n, "D", 0.0, 0.0, 10.0, 10.0, true, false).unwrap();
    assert_eq!(d, 3);
    assert_eq!(s.get_list_of_node_indices(n).unwrap(), vec![0, 2, 3]);
    assert_eq!(s.get_node_id(n, 1).unwrap_err().code(), -7);
    assert_eq!(s.get_node_index(n, "B").unwrap_err().code(), -2);
}

#[test]
fn create_reaction_checks() {
    let (mut s, n) = net_with(&["A", "B"]);
    assert!(s.create_reaction(99, "r", &[], &[1]).unwrap_err().is_value());
    assert_eq!(s.create_reaction(99, "r", &[0], &[1]).unwrap_err().code(), -5);
    assert_eq!(s.create_reaction(n, "r", &[0], &[7]).unwrap_err().code(), -7);
    assert!(s.create_reaction(n, "r", &[0, 1], &[1, 0]).unwrap_err().is_value());
    s.create_reaction(n, "r", &[0], &[1]).unwrap();
    assert_eq!(s.create_reaction(n, "r", &[1], &[0]).unwrap_err().code(), -3);
    assert_eq!(s.get_reaction_index(n, "r").unwrap(), 0);
    s.validate_state().unwrap();
}

#[test]
fn stoich_must_be_positive() {
    let (mut s, n) = net_with(&["A", "B", "C"]);
    let r = s.create_reaction(n, "r", &[0], &[1]).unwrap();
    assert_eq!(s.set_reaction_src_node_stoich(n, r, 0, 0.0).unwrap_err().code(), -8);
    assert_eq!(s.set_reaction_src_node_stoich(n, r, 0, f64::NAN).unwrap_err().code(), -8);
    assert!(s.set_reaction_src_node_stoich(n, r, 1, 2.0).unwrap_err().is_value());
    assert_eq!(s.set_reaction_dest_node_stoich(n, r, 9, 2.0).unwrap_err().code(), -7);
    assert_eq!(s.add_dest_node(n, r, 2, -1.0).unwrap_err().code(), -8);
    s.set_reaction_dest_node_stoich(n, r, 1, 2.5).unwrap();
    assert_eq!(s.get_reaction_dest_node_stoich(n, r, 1).unwrap(), 2.5);
}

#[test]
fn participant_edits_keep_sides_valid() {
    let (mut s, n) = net_with(&["A", "B", "C"]);
    let r = s.create_reaction(n, "r", &[0, 1], &[1]).unwrap();
    assert_eq!(s.add_src_node(n, r, 0, 1.0).unwrap_err().code(), -3);
    assert!(s.delete_src_node(n, r, 0).unwrap_err().is_value());
    assert_eq!(s.delete_dest_node(n, r, 2).unwrap_err().code(), -2);
    assert!(s.delete_dest_node(n, r, 1).unwrap_err().is_value());

    // new handle sits halfway between the node and the center it joins
    let center = s.reaction_curves(n, r).unwrap().real_center();
    s.add_dest_node(n, r, 2, 3.0).unwrap();
    assert_eq!(s.get_src_reactions(n, 2).unwrap(), Vec::<u32>::new());
    assert_eq!(s.get_dest_reactions(n, 2).unwrap(), vec![r]);
    let node = s.get_node_center(n, 2).unwrap();
    let h = s.get_reaction_dest_node_handle_position(n, r, 2).unwrap();
    assert!(h.approx_eq(((node + center) * 0.5).round2()));

    s.delete_src_node(n, r, 1).unwrap();
    assert_eq!(s.get_list_of_reaction_src_nodes(n, r).unwrap(), vec![0]);
    s.validate_state().unwrap();
}

#[test]
fn alias_shares_species_attributes() {
    let (mut s, n) = net_with(&["A", "B"]);
    let a2 = s.add_alias_node(n, 0, 10.0, 200.0, 40.0, 20.0).unwrap();
    assert_eq!(s.get_node_id(n, a2).unwrap(), "A");
    assert_eq!(s.get_original_index(n, a2).unwrap(), Some(0));
    // an alias of an alias points at the concrete node
    let a3 = s.add_alias_node(n, a2, 10.0, 300.0, 40.0, 20.0).unwrap();
    assert_eq!(s.get_original_index(n, a3).unwrap(), Some(0));

    s.set_node_id(n, a2, "A1").unwrap();
    assert_eq!(s.get_node_id(n, 0).unwrap(), "A1");
    assert_eq!(s.set_node_id(n, a2, "B").unwrap_err().code(), -3);
    s.set_node_floating_status(n, a3, false).unwrap();
    assert!(s.is_boundary_node(n, 0).unwrap());
    assert_eq!(s.get_node_index(n, "A1").unwrap(), 0);
    s.validate_state().unwrap();
}

#[test]
fn alias_deletion_hands_entries_back() {
    let (mut s, n) = net_with(&["A", "B", "C"]);
    let alias = s.add_alias_node(n, 0, 0.0, 200.0, 50.0, 30.0).unwrap();
    let r = s.create_reaction(n, "r", &[alias], &[1]).unwrap();
    s.set_reaction_modifiers(n, r, &[alias, 2]).unwrap();

    assert_eq!(s.delete_node(n, 0).unwrap_err().code(), -4);
    s.delete_node(n, alias).unwrap();
    assert_eq!(s.get_list_of_reaction_src_nodes(n, r).unwrap(), vec![0]);
    assert_eq!(s.get_reaction_modifiers(n, r).unwrap(), vec![0, 2]);
    assert_eq!(s.get_src_reactions(n, 0).unwrap(), vec![r]);

    // deleting a free modifier drops it from the set
    s.delete_node(n, 2).unwrap();
    assert_eq!(s.get_reaction_modifiers(n, r).unwrap(), vec![0]);
    s.validate_state().unwrap();
}

#[test]
fn alias_handback_cannot_collapse_sides() {
    let (mut s, n) = net_with(&["A", "B"]);
    let alias = s.add_alias_node(n, 0, 0.0, 200.0, 50.0, 30.0).unwrap();
    s.create_reaction(n, "r", &[alias], &[0]).unwrap();
    let before = s.networks().clone();
    assert!(s.delete_node(n, alias).unwrap_err().is_value());
    assert_eq!(s.networks(), &before);
}

#[test]
fn alias_for_reaction_moves_participation() {
    let (mut s, n) = net_with(&["A", "B"]);
    let r = s.create_reaction(n, "r", &[0], &[1]).unwrap();
    let depth = s.undo_depth();
    let alias = s.alias_for_reaction(n, r, 0, 0.0, 200.0, 50.0, 30.0).unwrap();
    assert_eq!(s.undo_depth(), depth + 1);
    assert_eq!(s.get_list_of_reaction_src_nodes(n, r).unwrap(), vec![alias]);
    assert!(s.get_src_reactions(n, 0).unwrap().is_empty());
    s.delete_reaction(n, r).unwrap();
    s.delete_node(n, 0).unwrap();
    assert_eq!(s.get_number_of_nodes(n).unwrap(), 1);
    s.validate_state().unwrap();
}

#[test]
fn compartments_own_their_members() {
    let (mut s, n) = net_with(&["A", "B"]);
    let c = s.add_compartment(n, "cell", 0.0, 0.0, 500.0, 500.0).unwrap();
    assert_eq!(s.add_compartment(n, "cell", 0.0, 0.0, 10.0, 10.0).unwrap_err().code(), -3);
    assert!(s.add_compartment(n, &"x".repeat(2000), 0.0, 0.0, 10.0, 10.0).unwrap_err().is_value());
    assert!(s.add_compartment(99, "y", -1.0, 0.0, 10.0, 10.0).unwrap_err().is_value());
    assert_eq!(s.set_compartment_of_node(n, 0, Some(4)).unwrap_err().code(), -13);

    s.set_compartment_of_node(n, 0, Some(c)).unwrap();
    let alias = s.add_alias_node(n, 0, 0.0, 100.0, 10.0, 10.0).unwrap();
    assert_eq!(s.get_compartment_of_node(n, alias).unwrap(), Some(c));
    assert!(s.set_compartment_volume(n, c, -1.0).unwrap_err().is_value());
    s.set_compartment_volume(n, c, 2.0).unwrap();
    s.set_compartment_fill_color(n, c, Color::rgba(1, 2, 3, 4)).unwrap();
    assert_eq!(s.get_compartment_fill_color(n, c).unwrap(), Color::rgba(1, 2, 3, 4));

    s.delete_compartment(n, c).unwrap();
    assert_eq!(s.get_nodes_in_compartment(n, None).unwrap(), vec![0, 1, alias]);
    assert_eq!(s.get_compartment_of_node(n, 0).unwrap(), None);
    assert_eq!(s.get_nodes_in_compartment(n, Some(c)).unwrap_err().code(), -13);
    s.validate_state().unwrap();
}

#[test]
fn placement_bounds() {
    let (mut s, n) = net_with(&["A"]);
    assert!(s.set_node_coordinate(n, 0, -5.0, 0.0, false).unwrap_err().is_value());
    s.set_node_coordinate(n, 0, -5.0, 0.0, true).unwrap();
    assert_eq!(s.get_node_coordinate_and_size(n, 0).unwrap().0, Vec2::new(-5.0, 0.0));
    assert!(s.add_node(n, "B", 0.0, 0.0, 0.0, 10.0, true, false).unwrap_err().is_value());
    assert!(s.add_node(n, "B", f64::INFINITY, 0.0, 10.0, 10.0, true, false).unwrap_err().is_value());
    assert!(s.set_node_size(n, 0, 10.0, 1e9).unwrap_err().is_value());
}

#[test]
fn ids_share_one_length_cap() {
    let (mut s, n) = net_with(&["A", "B"]);
    let long = "x".repeat(iodine::geometry::limits::MAX_ID_LEN + 1);
    let depth = s.undo_depth();
    assert_eq!(s.add_node(n, &long, 0.0, 0.0, 10.0, 10.0, true, false).unwrap_err().code(), -12);
    assert_eq!(s.set_node_id(n, 0, &long).unwrap_err().code(), -12);
    assert_eq!(s.create_reaction(n, &long, &[0], &[1]).unwrap_err().code(), -12);
    assert_eq!(s.create_uni_uni(n, &long, "", 0, 1, 1.0, 1.0).unwrap_err().code(), -12);
    assert_eq!(s.add_compartment(n, &long, 0.0, 0.0, 10.0, 10.0).unwrap_err().code(), -12);
    assert_eq!(s.new_network(&long).unwrap_err().code(), -12);
    assert_eq!(s.undo_depth(), depth);

    let r = s.create_reaction(n, "r", &[0], &[1]).unwrap();
    assert_eq!(s.set_reaction_id(n, r, &long).unwrap_err().code(), -12);
    s.set_reaction_id(n, r, &"y".repeat(iodine::geometry::limits::MAX_ID_LEN)).unwrap();
}

#[test]
fn node_style_and_shapes() {
    let (mut s, n) = net_with(&["A"]);
    s.set_node_fill_color_rgb(n, 0, 1, 2, 3).unwrap();
    assert_eq!(s.get_node_fill_color_rgb(n, 0).unwrap(), Some(0x010203));
    assert!(s.set_node_fill_color_rgb(n, 0, 256, 0, 0).unwrap_err().is_value());
    s.set_node_border_width(n, 0, 4.0).unwrap();

    // circle inherits fill and border from the rectangle
    s.set_node_shape_index(n, 0, 1, true).unwrap();
    assert_eq!(s.get_node_shape(n, 0).unwrap().name, "circle");
    assert_eq!(s.get_node_fill_color_rgb(n, 0).unwrap(), Some(0x010203));
    assert_eq!(s.get_node_border_width(n, 0).unwrap(), Some(4.0));

    // a line has no fill
    s.set_node_shape_index(n, 0, 3, false).unwrap();
    assert_eq!(s.get_node_shape_index(n, 0).unwrap(), 3);
    assert_eq!(s.get_node_fill_color(n, 0).unwrap(), None);
    let red = PropertyValue::Color(Color::rgba(255, 0, 0, 255));
    assert!(s.set_node_primitive_property(n, 0, 0, "fill_color", &red).unwrap_err().is_value());
    assert!(s.set_node_primitive_property(n, 0, 5, "border_color", &red).unwrap_err().is_value());
    s.set_node_primitive_property(n, 0, 0, "border_color", &red).unwrap();
    assert_eq!(s.get_node_border_color(n, 0).unwrap(), Some(Color::rgba(255, 0, 0, 255)));

    s.set_node_primitive_property(n, 0, -1, "font_family", &PropertyValue::Text("monospace".into())).unwrap();
    assert_eq!(s.get_node_font_family(n, 0).unwrap(), FontFamily::Monospace);
    assert!(s.get_composite_shape_at(99).unwrap_err().is_value());
    assert_eq!(s.get_list_of_composite_shapes().len(), 7);
}

#[test]
fn reaction_attributes() {
    let (mut s, n) = net_with(&["A", "B", "M"]);
    let r = s.create_reaction(n, "r", &[0], &[1]).unwrap();
    assert_eq!(s.set_reaction_modifiers(n, r, &[7]).unwrap_err().code(), -7);
    s.set_reaction_modifiers(n, r, &[2]).unwrap();
    s.set_modifier_tip_style(n, r, TipStyle::Tee).unwrap();
    assert_eq!(s.get_modifier_tip_style(n, r).unwrap(), TipStyle::Tee);
    assert!(s.set_reaction_line_thickness(n, r, 0.0).unwrap_err().is_value());
    s.set_reaction_fill_color_alpha(n, r, 0.5).unwrap();
    assert_eq!(s.get_reaction_fill_color(n, r).unwrap().a, 127);
    s.set_reaction_id(n, r, "r2").unwrap();
    assert_eq!(s.get_list_of_reaction_ids(n).unwrap(), vec!["r2".to_string()]);

    s.set_reaction_center_pos(n, r, Some(Vec2::new(120.0, 80.0))).unwrap();
    assert_eq!(s.get_reaction_center_pos(n, r).unwrap(), Some(Vec2::new(120.0, 80.0)));
    s.set_reaction_center_pos(n, r, None).unwrap();
    assert_eq!(s.get_reaction_center_pos(n, r).unwrap(), None);

    let defaults = s.default_handle_positions(n, r).unwrap();
    assert_eq!(defaults.len(), 3);
    assert!(s.set_reaction_handle_positions(n, r, &defaults[..2]).unwrap_err().is_value());
    s.set_reaction_handle_positions(n, r, &defaults).unwrap();
    assert_eq!(s.get_reaction_center_handle_position(n, r).unwrap(), defaults[0].round2());

    s.set_parameter(n, "k1", 0.1).unwrap();
    assert!(s.set_parameter(n, "k2", f64::NAN).unwrap_err().is_value());
    assert_eq!(s.get_parameters(n).unwrap(), vec![("k1".to_string(), 0.1)]);
    s.remove_parameter(n, "k1").unwrap();
    assert!(s.get_parameters(n).unwrap().is_empty());

    s.clear_reactions(n).unwrap();
    assert_eq!(s.get_number_of_reactions(n).unwrap(), 0);
    let r = s.create_reaction(n, "again", &[0], &[1]).unwrap();
    assert_eq!(r, 1);
    s.validate_state().unwrap();
}
