mod observer_counts;
