mod test_arc_length_basic;
