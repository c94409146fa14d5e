#![warn(clippy::all, clippy::pedantic)]

use crate::attack::TargetCode;
use crate::config::Target;

/// Target code for the next attack under `policy`. `last` is the code this
/// category produced previously and only matters to `Target::Alternating`,
/// which starts at `CycleNext` and then flips between next and previous.
#[must_use]
pub fn next_target_code(policy: Target, last: Option<TargetCode>) -> TargetCode {
    match policy {
        Target::Incoming => TargetCode::Incoming,
        Target::CycleNext => TargetCode::CycleNext,
        Target::CyclePrevious => TargetCode::CyclePrevious,
        Target::CycleAlternate => TargetCode::CycleAlternate,
        Target::All => TargetCode::All,
        Target::AllOthers => TargetCode::AllOthers,
        Target::AllDivided => TargetCode::AllDivided,
        Target::AllOthersDivided => TargetCode::AllOthersDivided,
        Target::Alternating => match last {
            Some(TargetCode::CycleNext) => TargetCode::CyclePrevious,
            _ => TargetCode::CycleNext,
        },
    }
}

/// Attack categories that remember their own last target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Garbage,
    Push,
    Displace,
    Drop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastTargets {
    pub garbage: Option<TargetCode>,
    pub push: Option<TargetCode>,
    pub displace: Option<TargetCode>,
    pub drop: Option<TargetCode>,
}

impl LastTargets {
    fn slot(&mut self, category: Category) -> &mut Option<TargetCode> {
        match category {
            Category::Garbage => &mut self.garbage,
            Category::Push => &mut self.push,
            Category::Displace => &mut self.displace,
            Category::Drop => &mut self.drop,
        }
    }

    /// Computes and records the next target for `category`.
    pub fn next(&mut self, category: Category, policy: Target) -> TargetCode {
        let slot = self.slot(category);
        let code = next_target_code(policy, *slot);
        *slot = Some(code);
        code
    }

    #[must_use]
    pub fn as_array(&self) -> [Option<TargetCode>; 4] {
        [self.garbage, self.push, self.displace, self.drop]
    }

    #[must_use]
    pub fn from_array(codes: [Option<TargetCode>; 4]) -> Self {
        let [garbage, push, displace, drop] = codes;
        Self {
            garbage,
            push,
            displace,
            drop,
        }
    }
}
