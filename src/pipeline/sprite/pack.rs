//! Growing binary-tree packer.
//!
//! Blocks are sorted largest side first. The root starts at the size of the
//! first block; when nothing fits, the tree grows right or down, whichever
//! keeps the sheet closer to square.

/// Top-left corner of a packed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Packing result. `placements` follows the input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packed {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    used: bool,
    right: Option<usize>,
    down: Option<usize>,
}

impl Node {
    fn free(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            used: false,
            right: None,
            down: None,
        }
    }
}

struct Tree {
    nodes: Vec<Node>,
    root: usize,
}

impl Tree {
    fn new(w: u32, h: u32) -> Self {
        Self {
            nodes: vec![Node::free(0, 0, w, h)],
            root: 0,
        }
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn find(&self, id: usize, w: u32, h: u32) -> Option<usize> {
        let node = &self.nodes[id];
        if node.used {
            node.right
                .and_then(|r| self.find(r, w, h))
                .or_else(|| node.down.and_then(|d| self.find(d, w, h)))
        } else if w <= node.w && h <= node.h {
            Some(id)
        } else {
            None
        }
    }

    fn split(&mut self, id: usize, w: u32, h: u32) -> Placement {
        let Node { x, y, w: nw, h: nh, .. } = self.nodes[id];
        let down = self.push(Node::free(x, y + h, nw, nh - h));
        let right = self.push(Node::free(x + w, y, nw - w, h));
        let node = &mut self.nodes[id];
        node.used = true;
        node.down = Some(down);
        node.right = Some(right);
        Placement { x, y }
    }

    fn grow(&mut self, w: u32, h: u32) -> Placement {
        let root = self.nodes[self.root];
        let can_grow_down = w <= root.w;
        let can_grow_right = h <= root.h;
        let should_grow_right = can_grow_right && root.h >= root.w + w;
        let should_grow_down = can_grow_down && root.w >= root.h + h;

        if should_grow_right || (!should_grow_down && can_grow_right) {
            self.grow_right(w, h)
        } else if should_grow_down || can_grow_down {
            self.grow_down(w, h)
        } else if root.w <= root.h {
            // Wider than the whole sheet: make room first
            self.widen(w);
            self.grow_down(w, h)
        } else {
            self.heighten(h);
            self.grow_right(w, h)
        }
    }

    fn grow_right(&mut self, w: u32, h: u32) -> Placement {
        let old = self.nodes[self.root];
        let right = self.push(Node::free(old.w, 0, w, old.h));
        let root = self.push(Node {
            x: 0,
            y: 0,
            w: old.w + w,
            h: old.h,
            used: true,
            right: Some(right),
            down: Some(self.root),
        });
        self.root = root;
        self.place(w, h)
    }

    fn grow_down(&mut self, w: u32, h: u32) -> Placement {
        let old = self.nodes[self.root];
        let down = self.push(Node::free(0, old.h, old.w, h));
        let root = self.push(Node {
            x: 0,
            y: 0,
            w: old.w,
            h: old.h + h,
            used: true,
            right: Some(self.root),
            down: Some(down),
        });
        self.root = root;
        self.place(w, h)
    }

    /// Extend the sheet to at least `w` wide with an empty strip.
    fn widen(&mut self, w: u32) {
        let old = self.nodes[self.root];
        let extra = w - old.w;
        let right = self.push(Node::free(old.w, 0, extra, old.h));
        let root = self.push(Node {
            x: 0,
            y: 0,
            w,
            h: old.h,
            used: true,
            right: Some(right),
            down: Some(self.root),
        });
        self.root = root;
    }

    /// Extend the sheet to at least `h` tall with an empty strip.
    fn heighten(&mut self, h: u32) {
        let old = self.nodes[self.root];
        let extra = h - old.h;
        let down = self.push(Node::free(0, old.h, old.w, extra));
        let root = self.push(Node {
            x: 0,
            y: 0,
            w: old.w,
            h,
            used: true,
            right: Some(self.root),
            down: Some(down),
        });
        self.root = root;
    }

    fn place(&mut self, w: u32, h: u32) -> Placement {
        match self.find(self.root, w, h) {
            Some(id) => self.split(id, w, h),
            None => self.grow(w, h),
        }
    }
}

/// Pack blocks of `sizes` with `padding` pixels between neighbours.
pub fn pack(sizes: &[(u32, u32)], padding: u32) -> Packed {
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| {
        let (aw, ah) = sizes[a];
        let (bw, bh) = sizes[b];
        bw.max(bh).cmp(&aw.max(ah)).then(bh.cmp(&ah))
    });

    let mut placements = vec![Placement::default(); sizes.len()];
    let Some(&first) = order.first() else {
        return Packed {
            width: 0,
            height: 0,
            placements,
        };
    };

    let padded = |i: usize| (sizes[i].0 + padding, sizes[i].1 + padding);
    let (w0, h0) = padded(first);
    let mut tree = Tree::new(w0, h0);
    for &i in &order {
        let (w, h) = padded(i);
        placements[i] = tree.place(w, h);
    }

    // Trailing padding is not part of the sheet
    let width = placements
        .iter()
        .zip(sizes)
        .map(|(p, (w, _))| p.x + w)
        .max()
        .unwrap_or(0);
    let height = placements
        .iter()
        .zip(sizes)
        .map(|(p, (_, h))| p.y + h)
        .max()
        .unwrap_or(0);

    Packed {
        width,
        height,
        placements,
    }
}
