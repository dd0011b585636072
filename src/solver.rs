use ndarray::Array2;
use petgraph::algo::astar;
use petgraph::graphmap::UnGraphMap;

use crate::location::Location;
use crate::shape::Direction;

/// One slot of the grid handed to [`find_path`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Occupancy {
    #[default]
    Open,
    Blocked,
}

/// Build the undirected graph of open cells, joining each to its open right and lower neighbours.
fn open_graph(grid: &Array2<Occupancy>) -> UnGraphMap<Location, ()> {
    let (rows, cols) = grid.dim();
    let mut graph = UnGraphMap::with_capacity(
        grid.len(),
        // "horizontal" edges
        (cols.saturating_sub(1)) * rows
            // "vertical" edges
            + (rows.saturating_sub(1)) * cols,
    );

    for (index, occupancy) in grid.indexed_iter() {
        if *occupancy == Occupancy::Blocked {
            continue;
        }

        let location = Location::from(index);
        graph.add_node(location);

        for neighbour in [Direction::Right, Direction::Down].map(|dir| dir.attempt_from(location)) {
            if grid.get(neighbour.as_index()) == Some(&Occupancy::Open) {
                graph.add_edge(location, neighbour, ());
            }
        }
    }

    graph
}

/// A shortest 4-directional path from `start` to `goal` through open cells, both endpoints included.
///
/// Returns [`None`] if either endpoint is blocked or off the grid, or if `goal` is unreachable.
pub fn find_path(grid: &Array2<Occupancy>, start: Location, goal: Location) -> Option<Vec<Location>> {
    for end in [start, goal] {
        if grid.get(end.as_index()) != Some(&Occupancy::Open) {
            return None;
        }
    }

    let graph = open_graph(grid);
    astar(
        &graph,
        start,
        |node| node == goal,
        |_| 1usize,
        |node| node.manhattan(goal),
    ).map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn parse(rows: &str) -> Array2<Occupancy> {
        let lines = rows.lines().collect_vec();
        Array2::from_shape_fn((lines.len(), lines[0].len()), |(y, x)| match lines[y].as_bytes()[x] {
            b'#' => Occupancy::Blocked,
            _ => Occupancy::Open,
        })
    }

    #[test]
    fn straight_line() {
        let grid = parse("....\n....");
        let path = find_path(&grid, Location(0, 0), Location(3, 0)).unwrap();
        assert_eq!(path, vec![Location(0, 0), Location(1, 0), Location(2, 0), Location(3, 0)]);
    }

    #[test]
    fn detours_around_walls() {
        let grid = parse(".#...\n.#.#.\n...#.");
        let path = find_path(&grid, Location(0, 0), Location(4, 0)).unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&Location(0, 0)));
        assert_eq!(path.last(), Some(&Location(4, 0)));
        for (a, b) in path.iter().tuple_windows() {
            assert_eq!(a.manhattan(*b), 1);
            assert_eq!(grid[b.as_index()], Occupancy::Open);
        }
    }

    #[test]
    fn walled_off_goal() {
        let grid = parse("..#.\n..#.");
        assert_eq!(find_path(&grid, Location(0, 0), Location(3, 1)), None);
    }

    #[test]
    fn blocked_endpoint() {
        let grid = parse("#...");
        assert_eq!(find_path(&grid, Location(0, 0), Location(3, 0)), None);
        assert_eq!(find_path(&grid, Location(1, 0), Location(9, 0)), None);
    }
}
