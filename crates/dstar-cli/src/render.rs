use dstar_nav::{Grid, GridView, Position};

/// Renders the grid with the path overlaid: `S` start, `G` goal, `*` path, `#` wall, `.` floor.
pub fn render(grid: &Grid, path: &[Position], start: Position, goal: Position) -> String {
    let mut out = String::with_capacity(((grid.width() + 1) * grid.height()) as usize);
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let pos = Position::new(x, y);
            let glyph = if pos == start {
                'S'
            } else if pos == goal {
                'G'
            } else if !grid.is_walkable(pos) {
                '#'
            } else if path.contains(&pos) {
                '*'
            } else {
                '.'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
