//! Per-day appointment buckets and greedy overlap grouping.
//!
//! # Algorithm
//!
//! 1. Stable-sort the bucket's appointments by ascending start offset.
//! 2. Walk them in order. Each appointment joins the **first** group (in
//!    creation order) whose `[min, max]` range contains its start, extending
//!    the group's `max` when it ends later. Otherwise it opens a new group.
//! 3. Every member gets `slot.index` = its position in the group's member list
//!    and `slot.count` = the group size.
//!
//! This is first-fit, not an interval-graph coloring. A group's `max` can grow
//! and pull later appointments in (cascading), and groups are never merged:
//! two groups may end up covering overlapping time ranges.

use chrono::NaiveDate;

use crate::model::{Appointment, Slot};

/// One overlap cluster produced by [`group_overlaps`].
///
/// `members` are indices into the slice that was grouped.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapGroup {
    min: f64,
    max: f64,
    members: Vec<usize>,
}

impl OverlapGroup {
    fn open(index: usize, appt: &Appointment) -> Self {
        Self {
            min: appt.start_offset_hours(),
            max: appt.end_offset_hours(),
            members: vec![index],
        }
    }

    fn covers(&self, start: f64) -> bool {
        start >= self.min && start <= self.max
    }

    fn admit(&mut self, index: usize, appt: &Appointment) {
        self.members.push(index);
        if appt.end_offset_hours() > self.max {
            self.max = appt.end_offset_hours();
        }
    }

    /// Earliest start among the members. Fixed at creation.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Latest end among the members.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition appointments (already sorted by start) into overlap groups.
///
/// Groups are returned in creation order.
#[must_use]
pub fn group_overlaps(appointments: &[Appointment]) -> Vec<OverlapGroup> {
    let mut groups: Vec<OverlapGroup> = Vec::new();

    for (index, appt) in appointments.iter().enumerate() {
        let start = appt.start_offset_hours();
        match groups.iter_mut().find(|group| group.covers(start)) {
            Some(group) => group.admit(index, appt),
            None => groups.push(OverlapGroup::open(index, appt)),
        }
    }

    groups
}

/// The appointments filed under one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    day: NaiveDate,
    appointments: Vec<Appointment>,
    groups: Vec<OverlapGroup>,
}

impl DayBucket {
    #[must_use]
    pub const fn new(day: NaiveDate) -> Self {
        Self {
            day,
            appointments: Vec::new(),
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub const fn day(&self) -> NaiveDate {
        self.day
    }

    /// Append an appointment. Returns it back if its reference day is not
    /// this bucket's day.
    ///
    /// # Errors
    ///
    /// Returns the rejected appointment when the reference day does not match.
    pub fn push(&mut self, appt: Appointment) -> Result<(), Appointment> {
        if appt.reference_day() != self.day {
            return Err(appt);
        }
        self.appointments.push(appt);
        self.groups.clear();
        Ok(())
    }

    #[must_use]
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    /// Groups from the last [`arrange`](Self::arrange); empty before it runs.
    #[must_use]
    pub fn groups(&self) -> &[OverlapGroup] {
        &self.groups
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Sort by start, group overlaps, and assign every appointment its slot.
    ///
    /// Running it again on unchanged contents yields the same slots.
    pub fn arrange(&mut self) {
        self.appointments
            .sort_by(|a, b| a.start_offset_hours().total_cmp(&b.start_offset_hours()));
        self.groups = group_overlaps(&self.appointments);

        for group in &self.groups {
            let count = group.len();
            for (index, &member) in group.members().iter().enumerate() {
                self.appointments[member].set_slot(Slot { index, count });
            }
        }

        tracing::trace!(
            day = %self.day,
            appointments = self.appointments.len(),
            groups = self.groups.len(),
            "arranged day bucket"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 3).expect("valid date")
    }

    fn appt(start: &str, end: &str, title: &str) -> Appointment {
        let parse = |t: &str| {
            NaiveDateTime::parse_from_str(&format!("2024-01-03 {t}"), "%Y-%m-%d %H:%M")
                .expect("valid test time")
        };
        Appointment::new(parse(start), parse(end), title).expect("valid appointment")
    }

    fn bucket(appts: Vec<Appointment>) -> DayBucket {
        let mut bucket = DayBucket::new(day());
        for a in appts {
            bucket.push(a).expect("same day");
        }
        bucket
    }

    fn slots(bucket: &DayBucket) -> Vec<(String, Slot)> {
        bucket
            .appointments()
            .iter()
            .map(|a| (a.title().to_string(), a.slot().expect("slot assigned")))
            .collect()
    }

    #[test]
    fn empty_bucket_is_noop() {
        let mut b = DayBucket::new(day());
        b.arrange();
        assert!(b.is_empty());
        assert!(b.groups().is_empty());
    }

    #[test]
    fn push_rejects_other_days() {
        let mut b = DayBucket::new(NaiveDate::from_ymd_opt(2024, 1, 4).expect("date"));
        let rejected = b.push(appt("09:00", "10:00", "a")).expect_err("wrong day");
        assert_eq!(rejected.title(), "a");
        assert!(b.is_empty());
    }

    #[test]
    fn disjoint_appointments_each_get_solo_slot() {
        let mut b = bucket(vec![
            appt("13:00", "14:00", "lunch"),
            appt("09:00", "10:00", "standup"),
        ]);
        b.arrange();

        assert_eq!(b.groups().len(), 2);
        assert_eq!(
            slots(&b),
            vec![
                ("standup".to_string(), Slot::SOLO),
                ("lunch".to_string(), Slot::SOLO),
            ]
        );
    }

    #[test]
    fn overlapping_pair_shares_a_group() {
        let mut b = bucket(vec![
            appt("09:30", "10:30", "second"),
            appt("09:00", "10:00", "first"),
        ]);
        b.arrange();

        assert_eq!(b.groups().len(), 1);
        assert_eq!(
            slots(&b),
            vec![
                ("first".to_string(), Slot { index: 0, count: 2 }),
                ("second".to_string(), Slot { index: 1, count: 2 }),
            ]
        );
    }

    #[test]
    fn touching_boundary_counts_as_overlap() {
        let mut b = bucket(vec![appt("09:00", "10:00", "a"), appt("10:00", "11:00", "b")]);
        b.arrange();
        assert_eq!(b.groups().len(), 1);
        assert_eq!(b.groups()[0].members(), &[0, 1]);
    }

    #[test]
    fn expansion_cascades_into_later_appointments() {
        // "b" extends the group to 12:00, which pulls "c" in although "c"
        // does not overlap "a".
        let mut b = bucket(vec![
            appt("09:00", "10:00", "a"),
            appt("09:30", "12:00", "b"),
            appt("11:00", "11:30", "c"),
        ]);
        b.arrange();

        assert_eq!(b.groups().len(), 1);
        let group = &b.groups()[0];
        assert!((group.min() - 9.0).abs() < f64::EPSILON);
        assert!((group.max() - 12.0).abs() < f64::EPSILON);
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn first_fit_picks_earliest_created_group() {
        let mut b = bucket(vec![
            appt("08:00", "09:00", "a"),
            appt("10:00", "12:00", "b"),
            appt("11:00", "11:30", "c"),
        ]);
        b.arrange();

        assert_eq!(b.groups().len(), 2);
        assert_eq!(b.groups()[0].members(), &[0]);
        assert_eq!(b.groups()[1].members(), &[1, 2]);
    }

    #[test]
    fn groups_are_never_merged() {
        // Unsorted input: the later-created group's range encloses the first.
        let appts = vec![appt("11:00", "12:00", "inner"), appt("09:00", "13:00", "outer")];
        let groups = group_overlaps(&appts);

        assert_eq!(groups.len(), 2);
        assert!(groups[1].min() < groups[0].min());
        assert!(groups[1].max() > groups[0].max());
    }

    #[test]
    fn cross_midnight_appointment_does_not_claim_later_starts() {
        // The end offset is measured from the end's own midnight, so the
        // first group spans [10, 2] and covers nothing. "meeting" runs
        // entirely inside "overnight" yet lands in its own group.
        let overnight = Appointment::new(
            NaiveDateTime::parse_from_str("2024-01-03 10:00", "%Y-%m-%d %H:%M").expect("time"),
            NaiveDateTime::parse_from_str("2024-01-04 02:00", "%Y-%m-%d %H:%M").expect("time"),
            "overnight",
        )
        .expect("valid appointment");
        let mut b = bucket(vec![overnight, appt("11:00", "12:00", "meeting")]);
        b.arrange();

        assert_eq!(b.groups().len(), 2);
        assert_eq!(
            slots(&b),
            vec![
                ("overnight".to_string(), Slot::SOLO),
                ("meeting".to_string(), Slot::SOLO),
            ]
        );
    }

    #[test]
    fn slots_partition_each_group() {
        let mut b = bucket(vec![
            appt("09:00", "11:00", "a"),
            appt("09:15", "09:45", "b"),
            appt("10:00", "10:30", "c"),
            appt("14:00", "15:00", "d"),
        ]);
        b.arrange();

        for group in b.groups() {
            let mut indices: Vec<usize> = group
                .members()
                .iter()
                .map(|&m| b.appointments()[m].slot().expect("slot").index)
                .collect();
            indices.sort_unstable();
            assert_eq!(indices, (0..group.len()).collect::<Vec<_>>());
            for &m in group.members() {
                assert_eq!(b.appointments()[m].slot().expect("slot").count, group.len());
            }
        }
    }

    #[test]
    fn arrange_is_idempotent() {
        let mut b = bucket(vec![
            appt("10:00", "11:00", "c"),
            appt("09:00", "10:30", "a"),
            appt("09:00", "09:30", "b"),
        ]);
        b.arrange();
        let first = slots(&b);
        let first_groups = b.groups().to_vec();
        b.arrange();
        assert_eq!(slots(&b), first);
        assert_eq!(b.groups(), first_groups.as_slice());
    }

    #[test]
    fn equal_starts_keep_insertion_order() {
        let mut b = bucket(vec![appt("09:00", "10:00", "x"), appt("09:00", "09:30", "y")]);
        b.arrange();
        assert_eq!(
            slots(&b),
            vec![
                ("x".to_string(), Slot { index: 0, count: 2 }),
                ("y".to_string(), Slot { index: 1, count: 2 }),
            ]
        );
    }
}
