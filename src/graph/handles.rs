use super::node::PortSpecification;

/// Number of input handles a freshly placed node gets.
///
/// Bounded nodes show all their ports. Unbounded nodes show one free port after
/// the used ones.
pub fn initial_input_handles(spec: &PortSpecification, used_inputs: usize) -> usize {
    match spec.max_input_ports {
        Some(max) => max.max(spec.min_input_ports).max(used_inputs),
        None => spec.min_input_ports.max(used_inputs + 1),
    }
}

/// Handle count an unbounded node should have given its highest occupied port.
///
/// Always exactly one free port after the highest occupied one, never fewer than
/// the minimum.
pub fn dynamic_input_handles(spec: &PortSpecification, max_occupied: Option<usize>) -> usize {
    let wanted = max_occupied.map_or(1, |handle| handle + 2);
    wanted.max(spec.min_input_ports)
}
